use crate::cookie::Cookie;

/// Accumulates the status, headers, cookies and body of one outbound
/// response.
pub trait Response {
    /// Sets the status code along with its canonical reason phrase, or an
    /// empty phrase when the code has none.
    fn set_status_code(&mut self, status_code: u16);

    /// Sets the status code with an explicit reason phrase.
    fn set_status_code_with_text(&mut self, status_code: u16, status_text: &str);

    fn status_code(&self) -> u16;

    fn status_text(&self) -> &str;

    /// Appends `value` to the header `name`, keeping earlier values.
    fn add_header(&mut self, name: &str, value: impl ToString);

    /// Replaces every value of the header `name` with `value`.
    fn set_header(&mut self, name: &str, value: impl ToString);

    /// Serialized header lines: the status line, then one line per header
    /// value in insertion order, then one `Set-Cookie` line per cookie.
    fn headers(&self) -> Vec<String>;

    /// Stores the cookie, replacing any cookie of the same name.
    fn add_cookie<C>(&mut self, cookie: C)
    where
        C: Cookie + Send + 'static;

    /// Empties the cookie's value and expires it, then stores it like
    /// [`Response::add_cookie`].
    fn delete_cookie<C>(&mut self, cookie: C)
    where
        C: Cookie + Send + 'static;

    fn set_content(&mut self, content: impl Into<String>);

    fn content(&self) -> &str;

    /// Points the client at `url` with `301` when `permanent`, `302`
    /// otherwise.
    fn redirect(&mut self, url: &str, permanent: bool);
}
