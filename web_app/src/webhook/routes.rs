use ntex::web;

/// Configures webhook routes for TurboDocx.
///
/// The route is public, authenticity comes from the signature headers.
///
/// # Routes
/// - `POST /webhook` - TurboDocx webhook receiver
pub fn turbodocx(cfg: &mut web::ServiceConfig) {
    cfg.service(super::turbodocx::receive);
}
