use crate::{
    OBJECT_PARAM,
    backend::{RowHandle, TableRef, memory::MemoryTable},
    bind::{Binder, Binding},
    config::BinderConfig,
    error::{Error, ErrorClass, ErrorOrigin},
    model::{ColumnKind, TableModel},
    obs::{self, ResolveOutcome},
    params::{ParameterError, Params, ValueMap},
    record::Record,
    registry::BindingError,
    resolve::{Outcome, Resolve, Strategy},
    test_support::{composite_table, people_table, person, values},
    traits::{ObjectHooks, TableObject},
    value::Value,
};
use std::rc::Rc;
use tabula_derive::TableObject;

fn bound<C: TableObject>(table: &MemoryTable) {
    Binder::new()
        .bind_table::<C>(table.handle(), &[])
        .expect("bind should succeed");
}

fn seeded(name: &str) -> MemoryTable {
    let table = people_table(name);
    table.insert(&person(1, "ada", 36)).expect("seed ada");
    table.insert(&person(2, "grace", 45)).expect("seed grace");

    table
}

fn parameter_error(err: &Error) -> &ParameterError {
    assert_eq!(err.class, ErrorClass::Parameter, "unexpected error: {err}");
    assert_eq!(err.origin, ErrorOrigin::Resolver);
    err.parameter_error().expect("parameter detail")
}

#[test]
fn strategies_run_in_fixed_order() {
    assert_eq!(
        Strategy::ORDER,
        [Strategy::PrimaryKey, Strategy::Object, Strategy::Hook]
    );
}

#[test]
fn full_primary_key_resolves_the_stored_row() {
    #[derive(TableObject)]
    #[table_object(columns(id, name, age))]
    struct KeyedPerson(Record);

    let table = seeded("resolve_keyed");
    bound::<KeyedPerson>(&table);

    let found = KeyedPerson::new(&Params::new().with("id", 2u64))
        .expect("lookup should succeed")
        .expect("row 2 should exist");

    assert_eq!(found.name().expect("name read"), Value::from("grace"));
    assert_eq!(found.age().expect("age read"), Value::Int(45));
    assert_eq!(table.lookup_count(), 1);
}

#[test]
fn primary_key_miss_is_none_and_does_not_fall_through() {
    #[derive(TableObject)]
    struct MissPerson(Record);

    let table = seeded("resolve_miss");
    bound::<MissPerson>(&table);
    let ada = table
        .lookup(&[Value::Uint(1)])
        .expect("lookup")
        .expect("ada exists");

    obs::reset();
    let params = Params::new().with("id", 99u64).with_row(OBJECT_PARAM, ada);
    let found = MissPerson::new(&params).expect("a miss is not an error");

    assert!(found.is_none());
    assert_eq!(obs::report().ops.pk_misses, 1);
    assert_eq!(obs::report().ops.object_wraps, 0);
}

#[test]
fn object_is_wrapped_when_the_key_is_incomplete() {
    #[derive(TableObject)]
    #[table_object(columns(label))]
    struct Region(Record);

    let table = composite_table("resolve_composite");
    let row = table
        .insert(&values(&[
            ("region", Value::from("eu")),
            ("code", Value::Uint(7)),
            ("label", Value::from("seven")),
        ]))
        .expect("insert");
    bound::<Region>(&table);

    let params = Params::new()
        .with("region", "eu")
        .with_row(OBJECT_PARAM, Rc::clone(&row));
    let region = Region::new(&params)
        .expect("resolve should succeed")
        .expect("object should be wrapped");

    assert!(Rc::ptr_eq(region.record().row(), &row));
    assert_eq!(region.label().expect("label read"), Value::from("seven"));
    assert_eq!(table.lookup_count(), 0, "incomplete key must not be looked up");
}

#[test]
fn object_param_shadows_a_column_of_the_same_name() {
    #[derive(Debug, TableObject)]
    #[table_object(columns(id))]
    struct Wrapper(Record);

    let model = TableModel::builder("resolve_object_column")
        .column("id", ColumnKind::Uint)
        .column("object", ColumnKind::Text)
        .primary_key(&["id"])
        .build()
        .expect("model should build");
    let table = MemoryTable::new(model);
    let row = table
        .insert(&values(&[
            ("id", Value::Uint(1)),
            ("object", Value::from("lamp")),
        ]))
        .expect("insert");
    bound::<Wrapper>(&table);

    let wrapped = Wrapper::new(&Params::new().with_row(OBJECT_PARAM, Rc::clone(&row)))
        .expect("resolve should succeed")
        .expect("object should be wrapped");
    assert!(Rc::ptr_eq(wrapped.record().row(), &row));
    assert_eq!(
        wrapped.record().get("object").expect("column read"),
        Value::from("lamp")
    );

    let err = Wrapper::new(&Params::new().with(OBJECT_PARAM, "lamp"))
        .expect_err("a plain value is not a row");
    assert!(matches!(
        parameter_error(&err),
        ParameterError::ShapeMismatch { name, .. } if name == OBJECT_PARAM
    ));
}

#[test]
fn no_strategy_applies_returns_none() {
    #[derive(TableObject)]
    struct Nobody(Record);

    let table = seeded("resolve_nothing");
    bound::<Nobody>(&table);

    obs::reset();
    let found = Nobody::new(&Params::new().with("name", "ada")).expect("resolve should succeed");

    assert!(found.is_none());
    assert_eq!(obs::report().ops.empty_resolutions, 1);
}

#[test]
fn unknown_params_follow_the_binding_policy() {
    #[derive(Debug, TableObject)]
    struct StrictParams(Record);

    #[derive(TableObject)]
    struct LooseParams(Record);

    let table = seeded("resolve_unknown_strict");
    bound::<StrictParams>(&table);

    let params = Params::new().with("id", 1u64).with("colour", "red");
    let err = StrictParams::new(&params).expect_err("unknown param should fail");
    assert!(matches!(
        parameter_error(&err),
        ParameterError::UnknownParam { name } if name == "colour"
    ));

    let loose = seeded("resolve_unknown_loose");
    let mut config = BinderConfig::default();
    config.params.allow_unknown = true;
    Binder::new()
        .with_config(config)
        .bind_table::<LooseParams>(loose.handle(), &[])
        .expect("bind should succeed");

    LooseParams::new(&params)
        .expect("unknown param should be ignored")
        .expect("row 1 should exist");
}

#[test]
fn column_values_are_checked_before_any_lookup() {
    #[derive(Debug, TableObject)]
    struct Checked(Record);

    let table = seeded("resolve_checked");
    bound::<Checked>(&table);

    let err = Checked::new(&Params::new().with("id", "one")).expect_err("text id should fail");
    assert_eq!(
        parameter_error(&err),
        &ParameterError::KindMismatch {
            column: "id".to_string(),
            expected: ColumnKind::Uint,
            found: "text",
        }
    );

    let err = Checked::new(&Params::new().with("id", Value::Null)).expect_err("null id should fail");
    assert!(matches!(
        parameter_error(&err),
        ParameterError::NullPrimaryKey { column } if column == "id"
    ));

    let err = Checked::new(&Params::new().with_list("name", vec![]))
        .expect_err("list for a column should fail");
    assert!(matches!(
        parameter_error(&err),
        ParameterError::ShapeMismatch { name, .. } if name == "name"
    ));

    assert_eq!(table.lookup_count(), 0);
}

#[test]
fn object_from_another_table_is_rejected() {
    #[derive(Debug, TableObject)]
    struct Picky(Record);

    let table = seeded("resolve_picky");
    let other = seeded("resolve_picky_other");
    bound::<Picky>(&table);
    let stranger = other
        .lookup(&[Value::Uint(1)])
        .expect("lookup")
        .expect("row exists");

    let err = Picky::new(&Params::new().with_row(OBJECT_PARAM, stranger))
        .expect_err("foreign row should fail");

    assert_eq!(
        parameter_error(&err),
        &ParameterError::ForeignRow {
            expected: "resolve_picky".to_string(),
            found: "resolve_picky_other".to_string(),
        }
    );
}

#[test]
fn unbound_class_is_a_binding_fault() {
    #[derive(Debug, TableObject)]
    struct Unbound(Record);

    let err = Unbound::new(&Params::new()).expect_err("unbound class should fail");

    assert_eq!(err.class, ErrorClass::Binding);
    assert_eq!(err.origin, ErrorOrigin::Resolver);
    assert!(matches!(
        err.binding_error(),
        Some(BindingError::UnboundClass { .. })
    ));
    assert!(Unbound::table().is_err());
}

///
/// Member
/// Exercises every hook.
///

#[derive(TableObject)]
#[table_object(columns(id, name), hooks)]
struct Member {
    record: Record,
    greeting: Option<String>,
    wrapped_object: bool,
}

impl ObjectHooks for Member {
    fn extra_params() -> &'static [&'static str] {
        &["greeting", "spawn"]
    }

    fn new_row(binding: &Binding, params: &Params) -> Result<Option<RowHandle>, Error> {
        if params.value("spawn").and_then(Value::as_bool) != Some(true) {
            return Ok(None);
        }

        let mut values = ValueMap::new();
        if let Some(name) = params.value("name") {
            values.insert("name".to_string(), name.clone());
        }

        Ok(Some(binding.table().insert(&values)?))
    }

    fn init(&mut self, params: &Params) -> Result<(), Error> {
        self.greeting = params
            .value("greeting")
            .and_then(Value::as_text)
            .map(str::to_string);
        self.wrapped_object = params.row(OBJECT_PARAM).is_some();

        Ok(())
    }
}

#[test]
fn hooks_construct_rows_and_init_sees_all_params() {
    let table = people_table("resolve_members");
    bound::<Member>(&table);

    obs::reset();
    let params = Params::new()
        .with("spawn", true)
        .with("name", "linus")
        .with("greeting", "hej");
    let member = Member::new(&params)
        .expect("hook should succeed")
        .expect("hook should produce a row");

    assert_eq!(member.name().expect("name read"), Value::from("linus"));
    assert_eq!(member.greeting.as_deref(), Some("hej"));
    assert!(!member.wrapped_object);
    assert_eq!(obs::report().ops.hook_rows, 1);

    assert_eq!(table.insert_count(), 1);
    assert!(
        table
            .lookup(&[member.id().expect("id read")])
            .expect("lookup")
            .is_some()
    );
}

#[test]
fn create_inserts_once_and_wraps_through_object() {
    #[derive(TableObject)]
    #[table_object(columns(id, name, age), hooks)]
    struct Created {
        record: Record,
        saw_object: bool,
    }

    impl ObjectHooks for Created {
        fn init(&mut self, params: &Params) -> Result<(), Error> {
            self.saw_object = params.row(OBJECT_PARAM).is_some();
            Ok(())
        }
    }

    let table = people_table("resolve_create");
    bound::<Created>(&table);

    let created = Created::create(&person(10, "edsger", 72)).expect("create should succeed");

    assert_eq!(table.insert_count(), 1);
    assert!(created.saw_object);
    assert!(created.record().is_live());
    assert!(!created.record().is_potential());
    assert_eq!(created.id().expect("id read"), Value::Uint(10));
    assert_eq!(created.name().expect("name read"), Value::from("edsger"));
    assert_eq!(created.age().expect("age read"), Value::Int(72));

    let found = Created::new(&Params::new().with("id", 10u64))
        .expect("lookup should succeed")
        .expect("created row should be found");
    assert_eq!(
        found.record().values().expect("values"),
        person(10, "edsger", 72)
    );
}

#[test]
fn create_rejects_bad_values_without_inserting() {
    #[derive(Debug, TableObject)]
    struct Guarded(Record);

    let table = people_table("resolve_create_guarded");
    bound::<Guarded>(&table);

    let err = Guarded::create(&values(&[("nickname", Value::from("x"))]))
        .expect_err("unknown column should fail");
    assert!(matches!(
        parameter_error(&err),
        ParameterError::UnknownColumn { column, .. } if column == "nickname"
    ));

    let err = Guarded::create(&values(&[("age", Value::from("old"))]))
        .expect_err("text age should fail");
    assert!(matches!(
        parameter_error(&err),
        ParameterError::KindMismatch { column, .. } if column == "age"
    ));

    assert_eq!(table.insert_count(), 0);
}

#[test]
fn backend_failures_surface_as_backend_errors() {
    #[derive(Debug, TableObject)]
    struct Twice(Record);

    let table = people_table("resolve_duplicate_key");
    bound::<Twice>(&table);

    Twice::create(&person(1, "ada", 36)).expect("first create should succeed");
    let err = Twice::create(&person(1, "ada", 36)).expect_err("duplicate key should fail");

    assert_eq!(err.class, ErrorClass::Backend);
    assert_eq!(table.insert_count(), 1);
}

#[test]
fn potential_wraps_without_persisting() {
    #[derive(TableObject)]
    #[table_object(columns(name))]
    struct Draft(Record);

    let table = people_table("resolve_potential");
    bound::<Draft>(&table);

    obs::reset();
    let draft = Draft::potential(&values(&[("name", Value::from("draft"))]))
        .expect("potential should succeed");

    assert!(draft.record().is_potential());
    assert!(!draft.record().is_live());
    assert_eq!(draft.name().expect("name read"), Value::from("draft"));
    assert!(table.is_empty());
    assert_eq!(table.insert_count(), 0);
    assert_eq!(obs::report().ops.potentials, 1);
}

#[test]
fn passthroughs_expose_the_bound_table() {
    #[derive(TableObject)]
    struct Described(Record);

    let table = people_table("resolve_passthrough");
    bound::<Described>(&table);

    assert_eq!(
        Described::table().expect("bound table").name(),
        "resolve_passthrough"
    );
    assert_eq!(Described::columns().expect("columns").len(), 3);
    assert_eq!(
        Described::column("age")
            .expect("column lookup")
            .map(|c| c.kind),
        Some(ColumnKind::Int)
    );
    assert!(Described::column("nickname").expect("column lookup").is_none());
    assert_eq!(
        Described::binding().expect("binding").table_name(),
        "resolve_passthrough"
    );
}

#[test]
fn record_updates_go_through_accessors() {
    #[derive(TableObject)]
    #[table_object(columns(age))]
    struct Aging(Record);

    let table = seeded("resolve_record_update");
    Binder::new()
        .bind_table::<Aging>(table.handle(), &["name"])
        .expect("bind should succeed");

    let aging = Aging::new(&Params::new().with("id", 1u64))
        .expect("lookup should succeed")
        .expect("ada exists");

    aging
        .record()
        .update(&values(&[("age", Value::Int(37))]))
        .expect("update should succeed");
    assert_eq!(aging.age().expect("age read"), Value::Int(37));

    let err = aging
        .record()
        .update(&values(&[("name", Value::from("ada l."))]))
        .expect_err("skipped column should not be writable");
    assert_eq!(err.origin, ErrorOrigin::Record);

    let err = aging.record().get("name").expect_err("skipped column has no accessor");
    assert!(matches!(
        err.parameter_error(),
        Some(ParameterError::NoAccessor { name, .. }) if name == "name"
    ));

    aging.record().delete().expect("delete should succeed");
    assert!(!aging.record().is_live());
}

#[test]
fn strategy_attempts_report_outcomes() {
    #[derive(TableObject)]
    struct Attempted(Record);

    let table = seeded("resolve_attempts");
    bound::<Attempted>(&table);
    let binding = Attempted::binding().expect("binding");

    let outcome = Strategy::PrimaryKey
        .attempt::<Attempted>(&binding, &Params::new().with("id", 1u64))
        .expect("attempt should succeed");
    assert!(matches!(outcome, Outcome::Resolved(_)));
    assert_eq!(Strategy::PrimaryKey.outcome(), ResolveOutcome::PrimaryKeyHit);

    let outcome = Strategy::Object
        .attempt::<Attempted>(&binding, &Params::new())
        .expect("attempt should succeed");
    assert!(matches!(outcome, Outcome::Skipped));

    let outcome = Strategy::Hook
        .attempt::<Attempted>(&binding, &Params::new())
        .expect("attempt should succeed");
    assert!(matches!(outcome, Outcome::Skipped));
}
