use micro_exchange::request::HttpRequest;
use micro_exchange::response::HttpResponse;

/// Application logic invoked once per request.
///
/// The handler reads the request view and fills in the response builder the
/// host created for this request; the host sends the response afterwards.
/// Any `Fn(&HttpRequest, &mut HttpResponse)` closure is a handler.
pub trait Handler: Send + Sync {
    fn handle(&self, request: &HttpRequest, response: &mut HttpResponse);
}

impl<F> Handler for F
where
    F: Fn(&HttpRequest, &mut HttpResponse) + Send + Sync,
{
    fn handle(&self, request: &HttpRequest, response: &mut HttpResponse) {
        (self)(request, response)
    }
}
