//! Auxiliary request components: info, data and HTML fragments.
//!
//! Each component posts one small model to the server and turns the answer
//! into a single event. They share the envelope, transport and error
//! formatting of the scene viewer but none of its display state.

use serde::Serialize;
use streaming::{
    DataRequestModel, HtmlRequestModel, HttpRequest, InfoModel, NamedProperties,
    SOURCE_DATA_REQUEST, SOURCE_HTML_REQUEST, SOURCE_INFO, SceneResponse, ServerError,
    TransportError, WireRequest, decode_json_payload, decode_text_payload,
};

use crate::error::ViewerError;
use crate::events::ViewerEvent;

/// One-shot request/response component.
pub trait Component {
    fn request(&self) -> Result<HttpRequest, ViewerError>;

    /// `None` when the response carries nothing for this component.
    fn interpret(&self, response: &SceneResponse) -> Result<Option<ViewerEvent>, ViewerError>;

    fn handle_response(
        &self,
        result: Result<serde_json::Value, TransportError>,
    ) -> Option<ViewerEvent> {
        let outcome = result
            .map_err(ViewerError::from)
            .and_then(|v| SceneResponse::from_value(v).map_err(ViewerError::from))
            .and_then(|response| {
                if response.has_error() {
                    let err = ServerError::decode(&response.error.clone().unwrap_or_default());
                    err.log();
                    return Err(ViewerError::Server(err));
                }
                self.interpret(&response)
            });
        match outcome {
            Ok(event) => event,
            Err(err) => Some(ViewerEvent::Error {
                message: err.to_string(),
            }),
        }
    }
}

fn post<M: Serialize>(url: Option<&str>, source: &str, model: M) -> Result<HttpRequest, ViewerError> {
    let url = url.ok_or_else(|| {
        ViewerError::Configuration(
            "'url' must point to an instance of the visualization server".to_string(),
        )
    })?;
    let body = WireRequest::new(source, model)
        .to_value()
        .map_err(|e| ViewerError::Parse(e.to_string()))?;
    Ok(HttpRequest::Post {
        url: url.to_string(),
        body,
    })
}

fn require_name(name: &str, what: &str) -> Result<(), ViewerError> {
    if name.is_empty() {
        return Err(ViewerError::Configuration(format!("'{what}' name must be set")));
    }
    Ok(())
}

/// Requests an info object (`info-response`).
#[derive(Debug, Clone, PartialEq)]
pub struct InfoRequest {
    pub url: Option<String>,
    pub info: NamedProperties,
    pub data_source: Option<NamedProperties>,
}

impl Component for InfoRequest {
    fn request(&self) -> Result<HttpRequest, ViewerError> {
        require_name(&self.info.name, "info")?;
        post(
            self.url.as_deref(),
            SOURCE_INFO,
            InfoModel {
                info_properties: self.info.clone(),
                data_source_properties: self.data_source.clone(),
            },
        )
    }

    fn interpret(&self, response: &SceneResponse) -> Result<Option<ViewerEvent>, ViewerError> {
        response
            .info
            .as_ref()
            .map(|info| decode_json_payload(info).map(ViewerEvent::InfoResponse))
            .transpose()
            .map_err(ViewerError::from)
    }
}

/// Requests a data payload (`data-response`); the payload is passed through.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRequest {
    pub url: Option<String>,
    pub request: NamedProperties,
    pub data: Option<NamedProperties>,
}

impl Component for DataRequest {
    fn request(&self) -> Result<HttpRequest, ViewerError> {
        require_name(&self.request.name, "data request")?;
        post(
            self.url.as_deref(),
            SOURCE_DATA_REQUEST,
            DataRequestModel {
                data_request_request: self.request.clone(),
                data_request: self.data.clone(),
            },
        )
    }

    fn interpret(&self, response: &SceneResponse) -> Result<Option<ViewerEvent>, ViewerError> {
        Ok(response.data.clone().map(ViewerEvent::DataResponse))
    }
}

/// Requests an HTML fragment (`html-response`).
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlRequest {
    pub url: Option<String>,
    pub request: NamedProperties,
    pub data: Option<NamedProperties>,
}

impl Component for HtmlRequest {
    fn request(&self) -> Result<HttpRequest, ViewerError> {
        require_name(&self.request.name, "html request")?;
        post(
            self.url.as_deref(),
            SOURCE_HTML_REQUEST,
            HtmlRequestModel {
                html_request: self.request.clone(),
                data_request: self.data.clone(),
            },
        )
    }

    fn interpret(&self, response: &SceneResponse) -> Result<Option<ViewerEvent>, ViewerError> {
        response
            .html
            .as_ref()
            .map(|html| decode_text_payload(html).map(|html| ViewerEvent::HtmlResponse { html }))
            .transpose()
            .map_err(ViewerError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn info() -> InfoRequest {
        InfoRequest {
            url: Some("http://localhost:8080/avs".into()),
            info: NamedProperties::new("version"),
            data_source: Some(NamedProperties {
                name: "sales".into(),
                user_properties: Some(json!({"year": 2018})),
            }),
        }
    }

    #[test]
    fn info_request_envelope() {
        let req = info().request().expect("request");
        let body = req.body().expect("body");
        assert_eq!(body["source"], json!("avs-go-info"));
        assert_eq!(body["model"]["infoProperties"]["name"], json!("version"));
        assert_eq!(
            body["model"]["dataSourceProperties"]["userProperties"]["year"],
            json!(2018)
        );
    }

    #[test]
    fn info_response_is_decoded() {
        let event = info().handle_response(Ok(json!({"info": "%7B%22v%22%3A%221.0%22%7D"})));
        assert_eq!(event, Some(ViewerEvent::InfoResponse(json!({"v": "1.0"}))));
        assert_eq!(info().handle_response(Ok(json!({"other": 1}))), None);
    }

    #[test]
    fn html_is_url_decoded() {
        let html = HtmlRequest {
            url: Some("http://h/avs".into()),
            request: NamedProperties::new("legend"),
            data: None,
        };
        let event = html.handle_response(Ok(json!({"html": "%3Cb%3Ehi+there%3C%2Fb%3E"})));
        assert_eq!(
            event,
            Some(ViewerEvent::HtmlResponse {
                html: "<b>hi there</b>".into()
            })
        );
    }

    #[test]
    fn failures_become_error_events() {
        let data = DataRequest {
            url: None,
            request: NamedProperties::new("table"),
            data: None,
        };
        assert!(matches!(data.request(), Err(ViewerError::Configuration(_))));
        assert!(matches!(
            data.handle_response(Err(TransportError::Status(503))),
            Some(ViewerEvent::Error { .. })
        ));
        assert!(matches!(
            data.handle_response(Ok(json!({"error": "%7B%22GoType%22%3A2%7D"}))),
            Some(ViewerEvent::Error { .. })
        ));
        assert_eq!(
            data.handle_response(Ok(json!({"data": [1, 2]}))),
            Some(ViewerEvent::DataResponse(json!([1, 2])))
        );
    }
}
