use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Копия последнего удачно скачанного и разобранного прайса на диске.
///
/// Запись атомарная: сначала во временный файл рядом, затем rename,
/// так что при падении посередине на диске остаётся прежняя копия.
#[derive(Debug, Clone)]
pub(crate) struct RawCache {
    path: PathBuf,
}

impl RawCache {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn load(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }

    pub(crate) fn store(&self, bytes: &[u8]) -> io::Result<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path).inspect_err(|_| {
            let _ = fs::remove_file(&tmp);
        })
    }
}
