use std::{
    fs::{File, read_to_string},
    io::Write,
    path::Path,
};

/// Entry point when git invokes this binary as `GIT_SEQUENCE_EDITOR`.
///
/// Git calls `<editor> <todo>`; the editor string we export already carries
/// the generated script path, so the arguments arrive as `[script, todo]`.
///
/// # Returns
///
/// * `Ok(())` on success.
/// * `Err(String)` if either path is missing or an I/O operation fails.
pub fn run(script_path: Option<&str>, todo_path: Option<&str>) -> Result<(), String> {
    match (script_path, todo_path) {
        (Some(script), Some(todo)) => install(Path::new(script), Path::new(todo)),
        (None, _) => Err(String::from("missing rewrite script path")),
        (Some(_), None) => Err(String::from("missing todo file path")),
    }
}

/// Replaces the todo list git generated with the prepared rewrite script.
///
/// The script is written verbatim, terminated by a newline. An empty script
/// is refused: git treats an empty todo list as "abort the rebase", which
/// would silently skip the rewrite.
pub fn install(script: &Path, todo: &Path) -> Result<(), String> {
    let body = match read_to_string(script) {
        Ok(content) => content,
        Err(e) => return Err(format!("read failed: {}", e)),
    };

    if body.trim().is_empty() {
        return Err(String::from("rewrite script is empty"));
    }

    let mut contents = body;
    if !contents.ends_with('\n') {
        contents.push('\n');
    }

    let mut file = match File::create(todo) {
        Ok(f) => f,
        Err(e) => return Err(format!("create failed: {}", e)),
    };

    match file.write_all(contents.as_bytes()) {
        Ok(_) => Ok(()),
        Err(e) => Err(format!("write failed: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::run;
    use std::io::Write;

    #[test]
    fn replaces_generated_todo_with_script() {
        let mut script = tempfile::NamedTempFile::new().expect("failed to create script file");
        write!(script, "pick abc\nexec true").expect("failed to write script");
        let mut todo = tempfile::NamedTempFile::new().expect("failed to create todo file");
        writeln!(todo, "pick abc Initial commit").expect("failed to write todo");
        writeln!(todo, "# Rebase 123 onto 456").expect("failed to write comment");

        run(script.path().to_str(), todo.path().to_str()).expect("sequence editor failed");

        let s = std::fs::read_to_string(todo.path()).expect("failed to read todo");
        assert_eq!(s, "pick abc\nexec true\n");
    }

    #[test]
    fn missing_script_path_is_an_error() {
        assert_eq!(run(None, Some("todo")).unwrap_err(), "missing rewrite script path");
    }

    #[test]
    fn missing_todo_path_is_an_error() {
        assert_eq!(run(Some("script"), None).unwrap_err(), "missing todo file path");
    }

    #[test]
    fn empty_script_is_refused() {
        let script = tempfile::NamedTempFile::new().expect("failed to create script file");
        let todo = tempfile::NamedTempFile::new().expect("failed to create todo file");
        let result = run(script.path().to_str(), todo.path().to_str());
        assert_eq!(result.unwrap_err(), "rewrite script is empty");
    }

    #[test]
    fn unreadable_script_reports_read_failure() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let missing = dir.path().join("nope");
        let todo = dir.path().join("todo");
        let result = run(missing.to_str(), todo.to_str());
        assert!(result.unwrap_err().starts_with("read failed"));
    }
}
