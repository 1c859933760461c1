//! Value sources of the request view: query and body parameters, cookies.
//!
//! Duplicate keys resolve to the last occurrence. Multipart bodies are not
//! parsed, so the body parameters of anything but a form-encoded body are
//! empty and no uploaded files are ever produced.

use http::header;
use http::request::Parts;
use micro_exchange::request::Parameters;
use mime::Mime;
use tracing::debug;

use crate::error::ParseError;

/// Parameters of the request URI's query string.
pub fn query_parameters(head: &Parts) -> Result<Parameters, ParseError> {
    let Some(query) = head.uri.query() else {
        return Ok(Parameters::new());
    };

    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).map_err(ParseError::invalid_query)?;
    Ok(pairs.into_iter().collect())
}

/// Parameters of an `application/x-www-form-urlencoded` body.
pub fn body_parameters(head: &Parts, body: &[u8]) -> Result<Parameters, ParseError> {
    let Some(content_type) = head.headers.get(header::CONTENT_TYPE) else {
        return Ok(Parameters::new());
    };

    let Some(mime) = content_type.to_str().ok().and_then(|value| value.parse::<Mime>().ok()) else {
        debug!(content_type = ?content_type, "unparsable content type, no body parameters");
        return Ok(Parameters::new());
    };

    if mime.essence_str() != mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
        debug!(content_type = %mime, "body is not form encoded, no body parameters");
        return Ok(Parameters::new());
    }

    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body).map_err(ParseError::invalid_form)?;
    Ok(pairs.into_iter().collect())
}

/// Cookies of every `Cookie` header, names and values taken verbatim.
pub fn cookies(head: &Parts) -> Parameters {
    head.headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_owned(), value.trim().to_owned()))
        })
        .collect()
}
