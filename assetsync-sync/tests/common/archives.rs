//! Builds zip / tar / tar.gz fixtures.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

pub type Files<'a> = &'a [(&'a str, &'a str)];

fn append_tar<W: Write>(writer: W, files: Files<'_>) -> W {
    let mut builder = tar::Builder::new(writer);
    for (name, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap()
}

/// Write `files` into `path`, choosing the format from its suffix.
pub fn write(path: &Path, files: Files<'_>) {
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    let file = File::create(path).unwrap();
    if name.ends_with(".zip") {
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        append_tar(GzEncoder::new(file, Compression::default()), files)
            .finish()
            .unwrap();
    } else {
        append_tar(file, files);
    }
}

/// A tar.gz of `files` in memory.
pub fn tar_gz_bytes(files: Files<'_>) -> Vec<u8> {
    append_tar(GzEncoder::new(Vec::new(), Compression::default()), files)
        .finish()
        .unwrap()
}
