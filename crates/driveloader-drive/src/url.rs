//! URL construction helpers for the Drive v3 API.

use url::Url;

use crate::models::DriveConfig;

/// Fields requested from `files.list`.
pub const LIST_FIELDS: &str = "nextPageToken,files(id,name,mimeType,size,parents)";

fn files_url(config: &DriveConfig, suffix: &str) -> Url {
    let mut url = config.base_url.clone();
    let base_path = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{base_path}/files{suffix}"));
    url
}

fn file_url(config: &DriveConfig, id: &str, tail: &str) -> Url {
    files_url(config, &format!("/{}{tail}", urlencoding::encode(id)))
}

/// `files.list` for one page of `query`.
pub fn build_list_url(config: &DriveConfig, query: &str, page_token: Option<&str>) -> Url {
    let mut url = files_url(config, "");
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("q", query)
            .append_pair("fields", LIST_FIELDS)
            .append_pair("pageSize", &config.page_size.to_string());
        if let Some(token) = page_token {
            pairs.append_pair("pageToken", token);
        }
    }
    url
}

/// `files.get` returning only the size.
pub fn build_size_url(config: &DriveConfig, id: &str) -> Url {
    let mut url = file_url(config, id, "");
    url.query_pairs_mut().append_pair("fields", "size");
    url
}

/// `files.get` with `alt=media` (binary content).
pub fn build_media_url(config: &DriveConfig, id: &str) -> Url {
    let mut url = file_url(config, id, "");
    url.query_pairs_mut().append_pair("alt", "media");
    url
}

/// `files.export` to `mime_type`.
pub fn build_export_url(config: &DriveConfig, id: &str, mime_type: &str) -> Url {
    let mut url = file_url(config, id, "/export");
    url.query_pairs_mut().append_pair("mimeType", mime_type);
    url
}

/// Pull the file id out of a `/files/{id}` URL.
pub fn extract_file_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let mut segments = parsed.path_segments()?;
    segments.find(|s| *s == "files")?;
    let id = segments.next().filter(|s| !s.is_empty())?;
    urlencoding::decode(id).ok().map(|s| s.into_owned())
}
