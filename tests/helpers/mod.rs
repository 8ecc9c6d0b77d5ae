use std::fs;
use std::path::{Path, PathBuf};

/// Write a template file into the fixture directory
pub fn write_template(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create template directory");
    }
    fs::write(&path, content).expect("Failed to write template");
    path
}

/// A structurally valid template whose Usage line references `base`
pub fn valid_template(base: &str) -> String {
    format!(
        "---\n\
         allowed-tools: Read, Grep\n\
         description: Summarize repository activity\n\
         ---\n\
         # {base}\n\
         \n\
         Usage: /{base}\n",
        base = base
    )
}
