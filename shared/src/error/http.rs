//! ErrorCode -> HTTP status

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        use ErrorCode::*;
        match self {
            Success => StatusCode::OK,
            NotFound | CustomerNotFound | PeopleNotFound | CategoryNotFound | RewardNotFound
            | PresentationNotFound => StatusCode::NOT_FOUND,
            CustomerAlreadyExists | DuplicateEntry | CategoryNameExists | BarcodeExists => {
                StatusCode::CONFLICT
            }
            // Well-formed request refused by a balance, stock or state guard
            InsufficientPoints | InsufficientStock | RewardUnavailable | CustomerInactive => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            NotAuthenticated | TokenExpired | TokenInvalid => StatusCode::UNAUTHORIZED,
            PermissionDenied => StatusCode::FORBIDDEN,
            Unknown | InternalError | DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ValidationFailed | InvalidPointsDelta => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table() {
        let cases = [
            (ErrorCode::CustomerNotFound, 404),
            (ErrorCode::PresentationNotFound, 404),
            (ErrorCode::DuplicateEntry, 409),
            (ErrorCode::CategoryNameExists, 409),
            (ErrorCode::BarcodeExists, 409),
            (ErrorCode::InsufficientPoints, 422),
            (ErrorCode::InsufficientStock, 422),
            (ErrorCode::RewardUnavailable, 422),
            (ErrorCode::CustomerInactive, 422),
            (ErrorCode::TokenExpired, 401),
            (ErrorCode::PermissionDenied, 403),
            (ErrorCode::ValidationFailed, 400),
            (ErrorCode::InvalidPointsDelta, 400),
            (ErrorCode::DatabaseError, 500),
        ];
        for (code, status) in cases {
            assert_eq!(code.http_status().as_u16(), status, "{code:?}");
        }
    }
}
