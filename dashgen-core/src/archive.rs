use std::fs::File;
use std::io;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use walkdir::WalkDir;

/// Pack `dir` into a gzipped tarball at `out`. Archive paths start with the
/// directory's own name (`Foo.docset/Contents/...`).
pub fn write_tarball(dir: &Path, out: &Path) -> io::Result<()> {
    let root = dir
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "archive root has no name"))?;

    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let encoder = GzEncoder::new(File::create(out)?, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.mode(tar::HeaderMode::Deterministic);

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let name = Path::new(root).join(relative);

        if entry.file_type().is_dir() {
            builder.append_dir(&name, entry.path())?;
        } else if entry.file_type().is_file() {
            builder.append_path_with_name(entry.path(), &name)?;
        }
    }

    builder.into_inner()?.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;

    #[test]
    fn test_tarball_is_rooted_at_directory_name() {
        let dir = tempfile::tempdir().unwrap();
        let docset = dir.path().join("Foo.docset");
        std::fs::create_dir_all(docset.join("Contents/Resources")).unwrap();
        std::fs::write(docset.join("Contents/Info.plist"), "plist").unwrap();
        std::fs::write(docset.join("icon.png"), "png").unwrap();

        let out = dir.path().join("feed/Foo.tgz");
        write_tarball(&docset, &out).unwrap();

        let mut archive = tar::Archive::new(GzDecoder::new(File::open(&out).unwrap()));
        let mut names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().trim_end_matches('/').to_string())
            .collect();
        names.sort();

        assert_eq!(
            names,
            vec![
                "Foo.docset",
                "Foo.docset/Contents",
                "Foo.docset/Contents/Info.plist",
                "Foo.docset/Contents/Resources",
                "Foo.docset/icon.png",
            ]
        );
    }
}
