use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Reads a whole dataset file.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn read_snapshot_file<P: AsRef<Path>>(path: P) -> io::Result<Option<Vec<u8>>> {
	match fs::read(path) {
		Ok(bytes) => Ok(Some(bytes)),
		Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
		Err(e) => Err(e),
	}
}

/// Writes a dataset file.
///
/// The bytes go to a uniquely named temporary file in the same directory,
/// which is then renamed over `path`, so readers see either the old or the
/// new file and concurrent writers never share a temporary file.
/// Missing parent directories are created.
pub fn write_snapshot_file<P: AsRef<Path>>(path: P, bytes: &[u8]) -> io::Result<()> {
	let path = path.as_ref();
	let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
		Some(parent) => {
			fs::create_dir_all(parent)?;
			parent
		}
		None => Path::new("."),
	};

	let mut tmp = NamedTempFile::new_in(parent)?;
	tmp.write_all(bytes)?;
	tmp.as_file().sync_all()?;
	tmp.persist(path).map_err(|e| e.error)?;
	Ok(())
}

/// Builds the binary cache path of a dataset file.
///
/// Example:
/// `resources/data.json` → `resources/data.bin`
pub fn binary_cache_path<P: AsRef<Path>>(input_path: P) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension("bin");

	Ok(output)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_binary_cache_path() {
		assert_eq!(binary_cache_path("resources/data.json").unwrap(), PathBuf::from("resources/data.bin"));
		assert_eq!(binary_cache_path("data.json").unwrap(), PathBuf::from("data.bin"));
		assert!(binary_cache_path("/").is_err());
	}

	#[test]
	fn test_read_missing_file() {
		let dir = tempfile::tempdir().unwrap();
		assert!(read_snapshot_file(dir.path().join("absent.json")).unwrap().is_none());
	}

	#[test]
	fn test_write_then_read() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("nested/data.json");
		write_snapshot_file(&path, b"{}").unwrap();
		assert_eq!(read_snapshot_file(&path).unwrap().as_deref(), Some(&b"{}"[..]));
	}

	#[test]
	fn test_overwrite_leaves_no_temporary_files() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("data.json");
		write_snapshot_file(&path, b"first").unwrap();
		write_snapshot_file(&path, b"second").unwrap();
		assert_eq!(read_snapshot_file(&path).unwrap().as_deref(), Some(&b"second"[..]));
		assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
	}
}
