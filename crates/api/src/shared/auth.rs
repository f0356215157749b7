use crate::error::NudgeError;
use actix_web::HttpRequest;
use nudge_infra::NudgeContext;

pub const API_KEY_HEADER: &str = "nudge-api-key";

/// Only the surrounding system, which knows the api key, may call the api
pub fn protect_route(req: &HttpRequest, ctx: &NudgeContext) -> Result<(), NudgeError> {
    let api_key = match req.headers().get(API_KEY_HEADER) {
        Some(api_key) => match api_key.to_str() {
            Ok(api_key) => api_key,
            Err(_) => {
                return Err(NudgeError::Unauthorized(
                    "Malformed api key provided".to_string(),
                ))
            }
        },
        None => {
            return Err(NudgeError::Unauthorized(format!(
                "Unable to find api-key in {} header",
                API_KEY_HEADER
            )))
        }
    };

    if api_key == ctx.config.api_key {
        Ok(())
    } else {
        Err(NudgeError::Unauthorized(format!(
            "Invalid api-key provided in {} header",
            API_KEY_HEADER
        )))
    }
}
