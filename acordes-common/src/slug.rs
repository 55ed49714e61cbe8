//! Song identifier derivation

/// Build the stable song id from artist and title
///
/// Lowercases, keeps alphanumeric runs (any script) and joins them with a
/// single `-`, artist first.
///
/// ```
/// use acordes_common::slug::song_slug;
///
/// assert_eq!(song_slug("Guns N' Roses", "Sweet Child O' Mine"), "guns-n-roses-sweet-child-o-mine");
/// ```
pub fn song_slug(artist: &str, title: &str) -> String {
    let mut slug = String::with_capacity(artist.len() + title.len() + 1);
    let mut pending_separator = false;

    for c in artist.chars().chain(std::iter::once(' ')).chain(title.chars()) {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}
