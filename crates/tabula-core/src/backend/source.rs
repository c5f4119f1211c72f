use crate::backend::{BackendError, RowHandle, RowSource};

///
/// IterSource
///
/// Adapts any iterator of row results into a `RowSource`.
/// Useful for joins that interleave rows from several tables.
///

#[derive(Debug)]
pub struct IterSource<I> {
    iter: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = Result<RowHandle, BackendError>>,
{
    pub const fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<I> RowSource for IterSource<I>
where
    I: Iterator<Item = Result<RowHandle, BackendError>>,
{
    fn next_row(&mut self) -> Result<Option<RowHandle>, BackendError> {
        self.iter.next().transpose()
    }
}
