// Asset tree compiled into the binary.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use embedfs_core::{EmbeddedFileSystem, FileInfo, FileMode};

const INDEX_HTML: &[u8] = include_bytes!("../assets/index.html");
const SITE_CSS: &[u8] = include_bytes!("../assets/css/site.css");
const ROBOTS_TXT: &[u8] = include_bytes!("../assets/robots.txt");

/// Modification time stamped on every asset: `SOURCE_DATE_EPOCH` at build
/// time when set, otherwise the Unix epoch.
fn baked_mod_time() -> SystemTime {
    option_env!("SOURCE_DATE_EPOCH")
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(|secs| UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap_or(UNIX_EPOCH)
}

fn file_info(name: &str, content: &[u8]) -> FileInfo {
    FileInfo::new(name, content.len() as i64, FileMode::file(0o444), baked_mod_time())
}

fn dir_info(name: &str) -> FileInfo {
    FileInfo::new(name, 0, FileMode::dir(0o555), baked_mod_time())
}

/// Build the store for the baked assets.
pub fn store() -> EmbeddedFileSystem {
    let index = file_info("index.html", INDEX_HTML);
    let robots = file_info("robots.txt", ROBOTS_TXT);
    let css = dir_info("css");
    let site = file_info("site.css", SITE_CSS);

    EmbeddedFileSystem::builder()
        .dir("/", dir_info("/"), vec![index.clone(), css.clone(), robots.clone()])
        .file("/index.html", index, INDEX_HTML)
        .file("/robots.txt", robots, ROBOTS_TXT)
        .dir("/css", css, vec![site.clone()])
        .file("/css/site.css", site, SITE_CSS)
        .build()
}
