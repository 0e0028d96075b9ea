use actix_web::web::*;

use crate::handlers::signup;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(resource("/signup-user").route(post().to(signup::create)));
}
