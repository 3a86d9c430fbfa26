use rusqlite::Connection;
use sonia_core::db::open_db_in_memory;
use sonia_core::{
    Console, FileObjectStore, Flow, ObjectService, ObjectStore, SqliteObjectStore, StorageMode,
};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use tempfile::TempDir;

/// Output sink the test can read while the console still owns it.
#[derive(Clone, Default)]
struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.0.borrow_mut());
        String::from_utf8(bytes).unwrap()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct Harness<S: ObjectStore> {
    console: Console<S, SharedOutput>,
    output: SharedOutput,
}

impl<S: ObjectStore> Harness<S> {
    fn new(store: S, mode: StorageMode) -> Self {
        let output = SharedOutput::default();
        let console = Console::new(ObjectService::new(store, mode), output.clone());
        Self { console, output }
    }

    /// Runs one line and returns everything it printed.
    fn cmd(&mut self, line: &str) -> String {
        assert_eq!(self.console.onecmd(line).unwrap(), Flow::Continue);
        self.output.take()
    }

    fn create(&mut self, line: &str) -> String {
        let printed = self.cmd(line);
        let id = printed.trim_end().to_string();
        assert_eq!(id.len(), 36, "expected a uuid, got {printed:?}");
        id
    }
}

fn sqlite_harness(conn: &Connection) -> Harness<SqliteObjectStore<'_>> {
    Harness::new(SqliteObjectStore::new(conn), StorageMode::Db)
}

fn file_harness() -> (TempDir, Harness<FileObjectStore>) {
    let dir = tempfile::tempdir().unwrap();
    let store = FileObjectStore::open(dir.path().join("file.json")).unwrap();
    (dir, Harness::new(store, StorageMode::File))
}

fn check_create_and_show<S: ObjectStore>(h: &mut Harness<S>) {
    let id = h.create(r#"create User email="a@b.com" age=5 score=1.5 first_name="Betty_Lou""#);

    let shown = h.cmd(&format!("show User {id}"));
    assert!(shown.starts_with(&format!("[User] ({id}) {{'id': '{id}', 'created_at': '")));
    assert!(shown.contains("'age': 5"));
    assert!(shown.contains("'email': 'a@b.com'"));
    assert!(shown.contains("'first_name': 'Betty Lou'"));
    assert!(shown.contains("'score': 1.5"));
    assert!(shown.ends_with("}\n"));

    let dot_call = h.cmd(&format!("User.show(\"{id}\")"));
    assert_eq!(dot_call, shown);
}

fn check_create_diagnostics<S: ObjectStore>(h: &mut Harness<S>) {
    assert_eq!(h.cmd("create"), "** class name missing **\n");
    assert_eq!(h.cmd("create Bogus name=\"x\""), "** class doesn't exist **\n");

    let id = h.create("create Place garbage name=\"Loft\" price_by_night=oops");
    let shown = h.cmd(&format!("show Place {id}"));
    assert!(shown.contains("'name': 'Loft'"));
    assert!(!shown.contains("garbage"));
    assert!(!shown.contains("price_by_night"));
}

fn check_show_diagnostics<S: ObjectStore>(h: &mut Harness<S>) {
    assert_eq!(h.cmd("show"), "** class name missing **\n");
    assert_eq!(h.cmd("show User"), "** instance id missing **\n");
    assert_eq!(h.cmd("show Bogus 123"), "** class doesn't exist **\n");
    assert_eq!(h.cmd("show User doesnotexist"), "** no instance found **\n");
    assert_eq!(h.cmd("User.show(\"\")"), "** instance id missing **\n");
}

fn check_destroy<S: ObjectStore>(h: &mut Harness<S>) {
    let id = h.create("create State name=\"California\"");
    let before = h.cmd("count State");

    assert_eq!(h.cmd("destroy State nope"), "** no instance found **\n");
    assert_eq!(h.cmd("count State"), before);

    assert_eq!(h.cmd(&format!("destroy State {id}")), "");
    assert_eq!(h.cmd(&format!("show State {id}")), "** no instance found **\n");
    assert_eq!(h.cmd(&format!("State.destroy(\"{id}\")")), "** no instance found **\n");
}

fn check_count<S: ObjectStore>(h: &mut Harness<S>) {
    for _ in 0..3 {
        h.create("create Review");
    }
    h.create("create Amenity");

    assert_eq!(h.cmd("count Review"), "3\n");
    assert_eq!(h.cmd("Review.count()"), "3\n");
    assert_eq!(h.cmd("count Amenity"), "1\n");
    assert_eq!(h.cmd("count Bogus"), "0\n");
    assert_eq!(h.cmd("count"), "0\n");
}

fn check_update<S: ObjectStore>(h: &mut Harness<S>) {
    let id = h.create("create User");

    assert_eq!(
        h.cmd(&format!(r#"update User {id} {{"first_name": "John", "age": 89}}"#)),
        ""
    );
    let shown = h.cmd(&format!("show User {id}"));
    assert!(shown.contains("'first_name': 'John'"));
    assert!(shown.contains("'age': 89"));

    assert_eq!(
        h.cmd(&format!(r#"update User {id} last_name "Doe" email "x@y.z""#)),
        ""
    );
    let shown = h.cmd(&format!("show User {id}"));
    assert!(shown.contains("'last_name': 'Doe'"));
    assert!(!shown.contains("email"));

    assert_eq!(
        h.cmd(&format!(r#"User.update("{id}", "nickname", "Johnny Boy")"#)),
        ""
    );
    assert_eq!(
        h.cmd(&format!(r#"User.update("{id}", {{'city': 'SF', 'zip': 94107}})"#)),
        ""
    );
    let shown = h.cmd(&format!("show User {id}"));
    assert!(shown.contains("'nickname': 'Johnny Boy'"));
    assert!(shown.contains("'city': 'SF'"));
    assert!(shown.contains("'zip': 94107"));
    assert!(shown.contains(&format!("'id': '{id}'")));
}

fn check_update_coercion_and_diagnostics<S: ObjectStore>(h: &mut Harness<S>) {
    let id = h.create("create Place");

    h.cmd(&format!("update Place {id} number_rooms 4"));
    h.cmd(&format!("update Place {id} latitude 37"));
    h.cmd(&format!("update Place {id} id hijacked"));
    let shown = h.cmd(&format!("show Place {id}"));
    assert!(shown.contains("'number_rooms': 4,") || shown.contains("'number_rooms': 4}"));
    assert!(shown.contains("'latitude': 37.0"));
    assert!(!shown.contains("hijacked"));

    assert_eq!(h.cmd("update"), "** class name missing **\n");
    assert_eq!(h.cmd("update Bogus"), "** class doesn't exist **\n");
    assert_eq!(h.cmd("update Place"), "** instance id missing **\n");
    assert_eq!(h.cmd("update Place nope name x"), "** no instance found **\n");
    assert_eq!(
        h.cmd(&format!("update Place {id}")),
        "** attribute name missing **\n"
    );
    assert_eq!(
        h.cmd(&format!("update Place {id} name")),
        "** value missing **\n"
    );
    assert_eq!(
        h.cmd(&format!(r#"update Place {id} {{"name": "Loft", "city_id": ""}}"#)),
        "** value missing **\n"
    );
    assert!(!h.cmd(&format!("show Place {id}")).contains("Loft"));
}

fn check_all<S: ObjectStore>(h: &mut Harness<S>) {
    assert_eq!(h.cmd("all City"), "[]\n");
    let id = h.create("create City name=\"San_Francisco\"");

    let listed = h.cmd("all City");
    assert!(listed.starts_with(&format!("[\"[City] ({id}) {{'id': '{id}'")));
    assert!(listed.contains("'name': 'San Francisco'"));
    assert!(listed.ends_with("}\"]\n"));
    assert_eq!(h.cmd("City.all()"), listed);
    assert_eq!(h.cmd("all City trailing words"), listed);

    assert!(h.cmd("all").contains(&format!("[City] ({id})")));
    assert_eq!(h.cmd("all Bogus"), "** class doesn't exist **\n");
}

fn check_numeric_limits<S: ObjectStore>(h: &mut Harness<S>) {
    let huge = format!("1{}.0", "0".repeat(400));
    let id = h.create(&format!(
        "create Place name=\"Edge\" latitude={huge} max_guest=9223372036854775808 \
         number_rooms=9223372036854775807 longitude=-122.42"
    ));
    let shown = h.cmd(&format!("show Place {id}"));
    assert!(shown.contains("'name': 'Edge'"));
    assert!(shown.contains("'number_rooms': 9223372036854775807"));
    assert!(shown.contains("'longitude': -122.42"));
    assert!(!shown.contains("latitude"));
    assert!(!shown.contains("max_guest"));

    // The map no longer parses, so the line is read as one positional pair.
    assert_eq!(
        h.cmd(&format!("update Place {id} {{\"latitude\": {huge}}}")),
        ""
    );
    assert_eq!(h.cmd(&format!("update Place {id} longitude nan")), "");
    let shown = h.cmd(&format!("show Place {id}"));
    assert!(!shown.contains("'latitude': "));
    assert!(shown.contains("'longitude': 'nan'"));
    assert!(!shown.contains("inf"));
}

fn check_passthrough<S: ObjectStore>(h: &mut Harness<S>) {
    assert_eq!(h.cmd("User.show"), "*** Unknown syntax: User.show\n");
    assert_eq!(h.cmd("User.fly()"), "*** Unknown syntax: User.fly()\n");
    assert_eq!(h.cmd("hello world"), "*** Unknown syntax: hello world\n");
}

fn run_all_checks<S: ObjectStore>(h: &mut Harness<S>) {
    check_create_and_show(h);
    check_create_diagnostics(h);
    check_show_diagnostics(h);
    check_destroy(h);
    check_count(h);
    check_update(h);
    check_update_coercion_and_diagnostics(h);
    check_all(h);
    check_numeric_limits(h);
    check_passthrough(h);
}

#[test]
fn console_commands_against_sqlite_backend() {
    let conn = open_db_in_memory().unwrap();
    let mut harness = sqlite_harness(&conn);
    run_all_checks(&mut harness);
}

#[test]
fn console_commands_against_file_backend() {
    let (_dir, mut harness) = file_harness();
    run_all_checks(&mut harness);
}

#[test]
fn file_backend_persists_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.json");

    let id = {
        let store = FileObjectStore::open(&path).unwrap();
        let mut harness = Harness::new(store, StorageMode::File);
        let id = harness.create("create Amenity name=\"Wifi\"");
        harness.cmd(&format!("update Amenity {id} floor 2"));
        id
    };

    let store = FileObjectStore::open(&path).unwrap();
    let mut harness = Harness::new(store, StorageMode::File);
    let shown = harness.cmd(&format!("show Amenity {id}"));
    assert!(shown.contains("'name': 'Wifi'"));
    assert!(shown.contains("'floor': '2'"));
}

#[test]
fn db_mode_create_accepts_explicit_id() {
    let conn = open_db_in_memory().unwrap();
    let mut harness = sqlite_harness(&conn);

    assert_eq!(harness.cmd("create User id=\"fixed-id\""), "fixed-id\n");
    assert!(harness.cmd("show User fixed-id").starts_with("[User] (fixed-id)"));
}

#[test]
fn file_mode_create_ignores_explicit_id() {
    let (_dir, mut harness) = file_harness();

    let id = harness.create("create User id=\"fixed-id\"");
    assert_ne!(id, "fixed-id");
    assert_eq!(harness.cmd("show User fixed-id"), "** no instance found **\n");
}

#[test]
fn file_backend_reloads_numbers_with_their_types() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.json");
    let huge = format!("1{}.0", "0".repeat(400));

    let id = {
        let store = FileObjectStore::open(&path).unwrap();
        let mut harness = Harness::new(store, StorageMode::File);
        let id = harness.create(&format!(
            "create Place latitude=37.77 longitude={huge} max_guest=2"
        ));
        harness.cmd(&format!(
            "update Place {id} {{'longitude': -122.5, 'price_by_night': 80.9}}"
        ));
        harness.cmd(&format!("update Place {id} {{'latitude': {huge}}}"));
        harness.cmd(&format!("update Place {id} number_bathrooms nan"));
        id
    };

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("null"));

    let store = FileObjectStore::open(&path).unwrap();
    let mut harness = Harness::new(store, StorageMode::File);
    let shown = harness.cmd(&format!("show Place {id}"));
    assert!(shown.contains("'latitude': 37.77"));
    assert!(shown.contains("'longitude': -122.5"));
    assert!(shown.contains("'max_guest': 2"));
    assert!(shown.contains("'price_by_night': 80"));
    assert!(!shown.contains("'price_by_night': 80.9"));
    assert!(shown.contains("'number_bathrooms': 'nan'"));
}

#[test]
fn text_with_quotes_is_shown_and_listed_like_string_literals() {
    let conn = open_db_in_memory().unwrap();
    let mut harness = sqlite_harness(&conn);

    let id = harness.create(r#"create City name="say_\"hi\"""#);
    assert!(harness
        .cmd(&format!("show City {id}"))
        .contains(r#"'name': 'say "hi"'"#));

    let listed = harness.cmd("all City");
    assert!(listed.starts_with(&format!(r"['[City] ({id}) {{\'id\': \'{id}\'")));
    assert!(listed.contains(r#"\'name\': \'say "hi"\'"#));

    harness.cmd(&format!(r#"update City {id} name "it's""#));
    assert!(harness
        .cmd(&format!("show City {id}"))
        .contains(r#"'name': "it's""#));
}
