//! Project handling against real directories.

use std::fs;
use std::path::Path;

use rhizome_tiller_cli::{CliError, Config, Project, collect_sources, write_outputs};

const PROGRAM: &str = r#"
class Program
{
    static void Main()
    {
        FarmUtils.SweepRow(3);
    }
}
"#;

const FARM_UTILS: &str = r#"
class FarmUtils
{
    public static void SweepRow(int length)
    {
        for (int i = 0; i < length; i++)
        {
            Harvest();
            Move(Direction.East);
        }
    }
}
"#;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("write source");
}

#[test]
fn test_collect_sources_sorted() {
    let temp_dir = tempfile::tempdir().unwrap();
    write(temp_dir.path(), "b.cs", "class B { }");
    write(temp_dir.path(), "a.cs", "class A { }");
    write(temp_dir.path(), "notes.txt", "not C#");
    fs::create_dir(temp_dir.path().join("nested")).unwrap();
    write(&temp_dir.path().join("nested"), "c.cs", "class C { }");

    let sources = collect_sources(&[temp_dir.path().to_path_buf()]).unwrap();
    let names: Vec<_> = sources
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.cs", "b.cs"]);
}

#[test]
fn test_translate_project() {
    let temp_dir = tempfile::tempdir().unwrap();
    write(temp_dir.path(), "Program.cs", PROGRAM);
    write(temp_dir.path(), "FarmUtils.cs", FARM_UTILS);

    let project = Project::load(&[temp_dir.path().to_path_buf()]).unwrap();
    assert_eq!(project.modules().len(), 2);
    assert_eq!(project.index().module_of("FarmUtils"), Some("FarmUtils"));
    assert!(project.collisions().is_empty());

    let out_dir = temp_dir.path().join("out");
    let outputs = project.translate(&Config::default());
    let written = write_outputs(&outputs, Some(&out_dir)).unwrap();
    assert_eq!(written.len(), 2);

    let main = fs::read_to_string(out_dir.join("main.py")).unwrap();
    assert_eq!(
        main,
        "import farm_utils\n\ndef main():\n\tfarm_utils.sweep_row(3)\n\nmain()\n"
    );

    let utils = fs::read_to_string(out_dir.join("farm_utils.py")).unwrap();
    assert_eq!(
        utils,
        "def sweep_row(length):\n\tfor i in range(length):\n\t\tharvest()\n\t\tmove(East)\n"
    );
}

#[test]
fn test_outputs_default_next_to_sources() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = temp_dir.path().join("Helpers.cs");
    fs::write(&source, "class Helpers { static void Idle() { } }").unwrap();

    let project = Project::load(&[source]).unwrap();
    let outputs = project.translate(&Config::default());
    let written = write_outputs(&outputs, None).unwrap();
    assert_eq!(written, vec![temp_dir.path().join("helpers.py")]);
    assert_eq!(
        fs::read_to_string(&written[0]).unwrap(),
        "def idle():\n\tpass\n"
    );
}

#[test]
fn test_type_collisions_keep_first_module() {
    let temp_dir = tempfile::tempdir().unwrap();
    write(temp_dir.path(), "a.cs", "class Shared { }");
    write(temp_dir.path(), "b.cs", "class Shared { }");

    let project = Project::load(&[temp_dir.path().to_path_buf()]).unwrap();
    assert_eq!(project.collisions().len(), 1);
    assert_eq!(project.index().module_of("Shared"), Some("a"));
}

#[test]
fn test_config_file_and_entry() {
    let temp_dir = tempfile::tempdir().unwrap();
    write(
        temp_dir.path(),
        "tiller.toml",
        "entry_module = \"Farm\"\nentry_output = \"start\"\n",
    );
    let config = Config::discover(temp_dir.path()).unwrap();
    assert_eq!(config.output_name("Farm"), "start.py");

    let missing = Config::discover(&temp_dir.path().join("nowhere")).unwrap();
    assert_eq!(missing, Config::default());
}

#[test]
fn test_invalid_config_is_an_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    write(temp_dir.path(), "tiller.toml", "entry_module = [");
    let err = Config::discover(temp_dir.path()).unwrap_err();
    assert!(err.to_string().starts_with("invalid config"));
}

#[test]
fn test_syntax_error_names_the_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    write(temp_dir.path(), "Broken.cs", "class Broken { void M( }");

    let err = Project::load(&[temp_dir.path().to_path_buf()]).unwrap_err();
    assert!(matches!(err, CliError::Parse { .. }));
    assert!(err.to_string().contains("Broken.cs"));
}

#[test]
fn test_missing_file_is_an_io_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let err = Project::load(&[temp_dir.path().join("Missing.cs")]).unwrap_err();
    assert!(matches!(err, CliError::Io { .. }));
}
