//! Key normalization: local paths, object keys, CDN paths

use std::path::{Component, Path};

const INDEX_DOCUMENT: &str = "index.html";

/// CacheKey for a file: `/` + path relative to the site root, `/`-separated
/// on every platform.
///
/// `None` when a component is not valid UTF-8; lossy conversion would let
/// distinct files share a key.
pub fn file_cache_key(relative: &Path) -> Option<String> {
    let mut key = String::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            key.push('/');
            key.push_str(part.to_str()?);
        }
    }
    if key.is_empty() {
        key.push('/');
    }
    Some(key)
}

/// CacheKey for a redirect source URL. A directory URL and its index
/// document map to the same deployed object.
pub fn redirect_cache_key(url: &str) -> String {
    if url.ends_with('/') {
        format!("{}{}", url, INDEX_DOCUMENT)
    } else {
        url.to_string()
    }
}

/// Trim slashes around a configured remote prefix; empty means no prefix.
pub fn normalize_prefix(prefix: Option<&str>) -> Option<String> {
    prefix
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

/// Object key for a CacheKey, never starting with `/`.
pub fn remote_key(prefix: Option<&str>, cache_key: &str) -> String {
    let relative = cache_key.trim_start_matches('/');
    match prefix {
        Some(prefix) => format!("{}/{}", prefix, relative),
        None => relative.to_string(),
    }
}

/// CDN path to invalidate for a CacheKey: index documents are invalidated
/// by their directory URL, which is what visitors request.
pub fn invalidation_path(cache_key: &str) -> String {
    let path = match cache_key.strip_suffix(INDEX_DOCUMENT) {
        Some(dir) if dir.ends_with('/') => dir,
        _ => cache_key,
    };
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn file_keys_use_forward_slashes() {
        let relative: PathBuf = ["blog", "2024", "post.html"].iter().collect();
        assert_eq!(
            file_cache_key(&relative).as_deref(),
            Some("/blog/2024/post.html")
        );
        assert_eq!(
            file_cache_key(Path::new("index.html")).as_deref(),
            Some("/index.html")
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_file_names_have_no_key() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let relative = Path::new("blog").join(OsStr::from_bytes(b"a\xff.html"));
        assert_eq!(file_cache_key(&relative), None);
    }

    #[test]
    fn redirect_directory_maps_to_index() {
        assert_eq!(redirect_cache_key("/blog/"), "/blog/index.html");
        assert_eq!(redirect_cache_key("/"), "/index.html");
        assert_eq!(redirect_cache_key("/old-page"), "/old-page");
    }

    #[test]
    fn prefix_normalization() {
        assert_eq!(normalize_prefix(Some("/site/")).as_deref(), Some("site"));
        assert_eq!(normalize_prefix(Some("a/b")).as_deref(), Some("a/b"));
        assert_eq!(normalize_prefix(Some("/")), None);
        assert_eq!(normalize_prefix(None), None);
    }

    #[test]
    fn remote_keys_have_no_leading_slash() {
        assert_eq!(remote_key(None, "/blog/index.html"), "blog/index.html");
        assert_eq!(remote_key(Some("site"), "/blog/index.html"), "site/blog/index.html");
        assert_eq!(remote_key(None, "/index.html"), "index.html");
    }

    #[test]
    fn index_documents_invalidate_directory() {
        assert_eq!(invalidation_path("/blog/index.html"), "/blog/");
        assert_eq!(invalidation_path("/index.html"), "/");
        assert_eq!(invalidation_path("/css/site.css"), "/css/site.css");
        assert_eq!(invalidation_path("/blog/myindex.html"), "/blog/myindex.html");
    }

    #[test]
    fn invalidation_paths_are_absolute() {
        assert_eq!(invalidation_path("old-page"), "/old-page");
    }
}
