use micro_exchange::cookie::SetCookie;
use micro_exchange::request::{HttpRequest, Request};
use micro_exchange::response::{HttpResponse, Response};
use micro_exchange_web::Server;

fn app(request: &HttpRequest, response: &mut HttpResponse) {
    match request.relative_path() {
        Ok("/") => {
            response.set_header("Content-Type", "text/plain; charset=utf-8");
            response.set_content(format!(
                "hello {} from {} over {}\r\n",
                request.parameter_or("name", "world"),
                request.ip_address().unwrap_or("unknown"),
                request.scheme(),
            ));
        }
        Ok("/login") => {
            response.add_cookie(SetCookie::new("session", "demo").with_path("/"));
            response.redirect("/", false);
        }
        Ok("/logout") => {
            response.delete_cookie(SetCookie::new("session", "").with_path("/"));
            response.redirect("/", false);
        }
        _ => {
            response.set_status_code(404);
            response.set_content("404 not found\r\n");
        }
    }
}

#[tokio::main]
async fn main() {
    Server::builder().address("127.0.0.1:3000").handler(app).build().unwrap().start().await;
}
