//! Log-safe rendering of connection URLs.

use std::fmt;

/// Displays a connection URL with any userinfo password replaced by `****`.
///
/// Only the authority (between `://` and the next `/`) is inspected, so an
/// `@` or `:` in the path or query is left alone.
#[derive(Debug, Clone, Copy)]
pub struct RedactedUrl<'a>(pub &'a str);

impl fmt::Display for RedactedUrl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url = self.0;
        let Some(scheme_end) = url.find("://").map(|i| i + 3) else {
            return f.write_str(url);
        };
        let rest = &url[scheme_end..];
        let authority_len = rest.find('/').unwrap_or(rest.len());
        let authority = &rest[..authority_len];

        let Some((userinfo, host)) = authority.rsplit_once('@') else {
            return f.write_str(url);
        };
        match userinfo.split_once(':') {
            Some((user, _password)) => write!(
                f,
                "{}{user}:****@{host}{}",
                &url[..scheme_end],
                &rest[authority_len..]
            ),
            None => f.write_str(url),
        }
    }
}
