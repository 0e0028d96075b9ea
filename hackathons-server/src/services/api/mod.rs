use actix_web::web::*;

mod health;
mod signup;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.configure(health::configure)
        .configure(signup::configure);
}
