use tabula::{
    backend::memory::MemoryTable,
    config::BinderConfig,
    error::{Error, ErrorClass},
    model::{ColumnKind, TableModel},
    obs,
    prelude::*,
    registry,
    traits::{ClassId, Path},
};

fn customers(name: &str) -> MemoryTable {
    let model = TableModel::builder(name)
        .column("id", ColumnKind::Ulid)
        .column("name", ColumnKind::Text)
        .column("email", ColumnKind::Text)
        .column("type", ColumnKind::Text)
        .primary_key(&["id"])
        .build()
        .expect("customer model should build");

    MemoryTable::new(model)
}

fn values(pairs: &[(&str, Value)]) -> ValueMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

///
/// Customer
///

#[derive(TableObject)]
#[table_object(columns(id, name, email))]
pub struct Customer(Record);

#[test]
fn derived_class_path_and_columns() {
    assert_eq!(Customer::PATH, "objects::Customer");
    assert_eq!(
        <Customer as tabula::traits::TableObject>::COLUMNS,
        &["id", "name", "email"]
    );
    assert_eq!(
        <Customer as tabula::traits::TableObject>::class_id(),
        ClassId::new("objects::Customer")
    );
}

#[test]
fn create_then_find_by_generated_key() {
    let table = customers("objects_customers");
    Binder::new()
        .bind_table::<Customer>(table.handle(), &["type"])
        .expect("bind should succeed");

    let ada = Customer::create(&values(&[
        ("name", Value::from("ada")),
        ("email", Value::from("ada@example.com")),
    ]))
    .expect("create should succeed");

    let id = ada.id().expect("id read");
    assert!(id.as_ulid().is_some(), "key should be generated");
    assert_eq!(table.insert_count(), 1);

    let found = Customer::new(&Params::new().with("id", id.clone()))
        .expect("lookup should succeed")
        .expect("customer should exist");
    assert_eq!(found.email().expect("email read"), Value::from("ada@example.com"));
    assert_eq!(found.record().values().expect("values").len(), 3);

    let missing = Customer::new(&Params::new().with("id", ulid::Ulid::nil()))
        .expect("a miss is not an error");
    assert!(missing.is_none());
}

///
/// Account
/// Keyword column, custom path and a field filled by `init`.
///

#[derive(TableObject)]
#[table_object(path = "shop::Account", columns(name, r#type), hooks)]
pub struct Account {
    #[table_object(record)]
    inner: Record,
    display: String,
}

impl ObjectHooks for Account {
    fn extra_params() -> &'static [&'static str] {
        &["prefix"]
    }

    fn init(&mut self, params: &Params) -> Result<(), Error> {
        let prefix = params
            .value("prefix")
            .and_then(Value::as_text)
            .unwrap_or("@");
        let name = self.name()?;
        self.display = format!("{prefix}{}", name.as_text().unwrap_or_default());

        Ok(())
    }
}

#[test]
fn custom_path_keyword_columns_and_init() {
    assert_eq!(Account::PATH, "shop::Account");

    let table = customers("objects_accounts");
    Binder::new()
        .bind_table::<Account>(table.handle(), &["email"])
        .expect("bind should succeed");

    let potential = Account::potential(&values(&[
        ("name", Value::from("grace")),
        ("type", Value::from("admin")),
    ]))
    .expect("potential should succeed");

    assert!(potential.record().is_potential());
    assert_eq!(potential.r#type().expect("type read"), Value::from("admin"));
    assert_eq!(potential.display, "@grace");
    assert!(table.is_empty());

    let row = table
        .insert(&values(&[("name", Value::from("linus"))]))
        .expect("insert");
    let wrapped = Account::new(
        &Params::new()
            .with_row(tabula::OBJECT_PARAM, row)
            .with("prefix", "~"),
    )
    .expect("resolve should succeed")
    .expect("object should be wrapped");
    assert_eq!(wrapped.display, "~linus");
}

#[test]
fn skipping_a_declared_column_fails_at_bind_time() {
    #[derive(TableObject)]
    #[table_object(columns(email))]
    struct Mailer(Record);

    let table = customers("objects_mailer");
    let err = Binder::new()
        .bind_table::<Mailer>(table.handle(), &["email"])
        .expect_err("declared column skipped");

    assert_eq!(err.class, ErrorClass::Parameter);
    assert!(registry::binding_of(ClassId::new(Mailer::PATH)).is_none());
}

#[test]
fn config_from_toml_rejects_duplicate_tables() {
    #[derive(TableObject)]
    struct First(Record);

    #[derive(TableObject)]
    struct Second(Record);

    let config = BinderConfig::from_toml_str(
        r#"
        [binding]
        on_duplicate_table = "reject"
        "#,
    )
    .expect("config should parse");
    let binder = Binder::new().with_config(config);

    let table = customers("objects_guarded");
    binder
        .bind_table::<First>(table.handle(), &[])
        .expect("first bind should succeed");
    let err = binder
        .bind_table::<Second>(table.handle(), &[])
        .expect_err("second class should be rejected");

    assert_eq!(err.class, ErrorClass::Binding);
    assert_eq!(
        registry::table_to_class("objects_guarded"),
        Some(ClassId::new(First::PATH))
    );
}

#[test]
fn counters_track_resolution() {
    #[derive(TableObject)]
    #[table_object(columns(name))]
    struct Counted(Record);

    let table = customers("objects_counted");
    Binder::new()
        .bind_table::<Counted>(table.handle(), &[])
        .expect("bind should succeed");

    obs::reset();
    let created = Counted::create(&values(&[("name", Value::from("x"))])).expect("create");
    let id = created.record().get("id").expect("id read");
    Counted::new(&Params::new().with("id", id))
        .expect("lookup")
        .expect("row exists");

    let report = obs::report();
    assert_eq!(report.ops.inserts, 1);
    assert_eq!(report.ops.pk_hits, 1);

    let class = report
        .classes
        .get(Counted::PATH)
        .expect("class counters should exist");
    assert_eq!(class.inserts, 1);
    assert_eq!(class.resolved, 1);

    let json = serde_json::to_string(&report).expect("report should serialize");
    assert!(json.contains("\"inserts\":1"));
}
