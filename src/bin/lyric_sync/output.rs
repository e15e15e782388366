use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Opens `path` for writing, creating parent directories, or stdout when `None`.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, String> {
    let Some(path) = path else {
        return Ok(Box::new(io::stdout().lock()));
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create output directory '{}': {err}",
                parent.display()
            )
        })?;
    }
    let file = File::create(path)
        .map_err(|err| format!("Failed to create output file '{}': {err}", path.display()))?;
    Ok(Box::new(io::BufWriter::new(file)))
}
