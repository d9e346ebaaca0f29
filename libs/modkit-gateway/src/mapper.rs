use crate::error::MapperError;
use crate::response::{DomainResponse, EndpointResponse, MappedResponse};

/// Turns an endpoint response into the shape a caller works with
pub trait ResponseMapper: Send + Sync {
    /// # Errors
    /// [`MapperError::Rejected`] is reported as an error domain response by
    /// the gateway; [`MapperError::Unexpected`] propagates to the caller.
    fn map_to_domain(&self, response: &EndpointResponse) -> Result<DomainResponse, MapperError>;
}

/// Mapper backed by a closure
pub struct ClosureMapper<F> {
    map: F,
}

impl<F> ClosureMapper<F>
where
    F: Fn(&EndpointResponse) -> Result<DomainResponse, MapperError> + Send + Sync,
{
    #[must_use]
    pub const fn new(map: F) -> Self {
        Self { map }
    }
}

impl<F> ResponseMapper for ClosureMapper<F>
where
    F: Fn(&EndpointResponse) -> Result<DomainResponse, MapperError> + Send + Sync,
{
    fn map_to_domain(&self, response: &EndpointResponse) -> Result<DomainResponse, MapperError> {
        (self.map)(response)
    }
}

/// Parses the body as JSON; success follows the status code
///
/// An empty body maps to `null`. Anything else that is not valid JSON is
/// rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBodyMapper;

impl ResponseMapper for JsonBodyMapper {
    fn map_to_domain(&self, response: &EndpointResponse) -> Result<DomainResponse, MapperError> {
        let body = if response.body().is_empty() {
            serde_json::Value::Null
        } else {
            response
                .body()
                .json()
                .map_err(|e| MapperError::Rejected(format!("Response body is not valid JSON: {e}")))?
        };
        Ok(MappedResponse::new(response.is_successful(), body).into())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::value_object::StatusCode;
    use http::HeaderMap;
    use serde_json::json;

    fn endpoint(code: u16, body: &'static str) -> EndpointResponse {
        EndpointResponse::new(StatusCode::new(code).unwrap(), body.into(), HeaderMap::new())
    }

    #[test]
    fn test_closure_mapper_invokes_closure() {
        let mapper = ClosureMapper::new(|response: &EndpointResponse| {
            Ok(MappedResponse::new(
                response.status().equals_code(201),
                json!({"echo": response.body().to_text()}),
            )
            .into())
        });

        let mapped = mapper.map_to_domain(&endpoint(201, "hi")).unwrap();
        assert!(mapped.is_successful());
        assert_eq!(mapped.as_mapped().unwrap().body(), &json!({"echo": "hi"}));
    }

    #[test]
    fn test_closure_mapper_error_passes_through() {
        let mapper = ClosureMapper::new(|_: &EndpointResponse| {
            Err(MapperError::Rejected("unexpected payload".to_owned()))
        });
        let err = mapper.map_to_domain(&endpoint(200, "")).unwrap_err();
        assert_eq!(err.to_string(), "unexpected payload");
    }

    #[test]
    fn test_json_body_mapper() {
        let mapped = JsonBodyMapper
            .map_to_domain(&endpoint(404, r#"{"error":"missing"}"#))
            .unwrap();
        assert!(!mapped.is_successful());
        assert_eq!(mapped.as_mapped().unwrap().body()["error"], "missing");

        let empty = JsonBodyMapper.map_to_domain(&endpoint(204, "")).unwrap();
        assert_eq!(empty.as_mapped().unwrap().body(), &serde_json::Value::Null);

        let err = JsonBodyMapper.map_to_domain(&endpoint(200, "<html>")).unwrap_err();
        assert!(err.is_recognized());
    }
}
