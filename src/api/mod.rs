pub mod endpoint;
pub mod error;
pub mod response;

use crate::logger::SIGN_IN_TARGET;
use crate::model;
pub use error::Error;
use reqwest::{Client, Response, StatusCode};
use response::device_code::DeviceCodeResponse;
use response::managed_devices::ManagedDevicesPage;
use response::token::TokenResponse;
use response::ErrorResponse;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

/* added to the polling interval when the identity platform answers `slow_down` */
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

pub fn api(authority_url: String, graph_url: String, timeout: Duration) -> model::Api {
    model::Api {
        authority_url,
        graph_url,
        timeout,
    }
}

fn build_client(api: &model::Api) -> Result<Client, Error> {
    reqwest::ClientBuilder::new()
        .timeout(api.timeout)
        .build()
        .map_err(|e| Error::InternalError(e.to_string()))
}

/// Map transport-level failures to Error
fn map_api_err(error: reqwest::Error) -> Error {
    match error.status() {
        Some(http::StatusCode::TOO_MANY_REQUESTS) => Error::RateExceeded(error.to_string()),
        Some(http::StatusCode::UNAUTHORIZED) => Error::LoginError(error.to_string()),
        Some(http::StatusCode::FORBIDDEN) => Error::Forbidden(error.to_string()),
        _ => Error::ApiError(error.to_string()),
    }
}

/// Process a parsed response body. 2xx carries the `value` forward; anything else is turned into
/// the most specific error the status and the error body allow.
fn map_response_status(status: StatusCode, value: Value) -> Result<Value, Error> {
    if status.is_success() {
        return Ok(value);
    }

    let detail = match serde_json::from_value::<ErrorResponse>(value.clone()) {
        Ok(e) => {
            match e.code() {
                "authorization_pending" => return Err(Error::AuthorizationPending),
                "slow_down" => return Err(Error::SlowDown),
                _ => {}
            }
            format!("{} {}: {}", status, e.code(), e.message())
        }
        Err(_) => format!("{}: {}", status, value),
    };

    match status {
        http::StatusCode::TOO_MANY_REQUESTS => Err(Error::RateExceeded(detail)),
        http::StatusCode::FORBIDDEN => Err(Error::Forbidden(detail)),
        /* the token endpoint answers rejected credentials with 400/401 */
        http::StatusCode::UNAUTHORIZED => Err(Error::LoginError(detail)),
        http::StatusCode::BAD_REQUEST if value.get("error_description").is_some() => {
            Err(Error::LoginError(detail))
        }
        _ => Err(Error::ApiError(detail)),
    }
}

async fn read_json(response: Response) -> Result<Value, Error> {
    let status = response.status();

    response
        .text()
        .await
        .map_err(|e| Error::ApiError(format!("Error reading API response: {}", e)))
        .map(|s| {
            serde_json::from_str::<Value>(&s).map_err(|e| Error::InvalidResponse(s, e.to_string()))
        })?
        .map(|value| map_response_status(status, value))?
}

async fn post_form(client: &Client, url: &str, form: &[(&str, &str)]) -> Result<Value, Error> {
    let response = client
        .post(url)
        .form(form)
        .send()
        .await
        .map_err(map_api_err)?;

    read_json(response).await
}

async fn get(api: &model::LoggedInApi, url: &str) -> Result<Value, Error> {
    let response = api
        .client
        .get(url)
        .bearer_auth(&api.access_token)
        .send()
        .await
        .map_err(map_api_err)?;

    log::trace!("GET {} -> {}", url, response.status());

    read_json(response).await
}

fn logged_in(
    client: Client,
    api: &model::Api,
    tenant: &str,
    value: Value,
) -> Result<model::LoggedInApi, Error> {
    serde_json::from_value::<TokenResponse>(value)
        .map_err(|e| Error::UnexpectedApiResponse(e.to_string()))
        .map(|token| {
            log::debug!("Access token acquired, expires in {}s", token.expires_in);
            model::LoggedInApi {
                graph_url: api.graph_url.to_owned(),
                tenant: tenant.to_owned(),
                access_token: token.access_token,
                client,
            }
        })
}

/// Acquire an application token with the client credentials grant.
pub async fn login(
    api: &model::Api,
    tenant_id: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<model::LoggedInApi, Error> {
    let client = build_client(api)?;
    let url = endpoint::authority(&api.authority_url, tenant_id, endpoint::TOKEN);

    let form = [
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("grant_type", endpoint::CLIENT_CREDENTIALS_GRANT),
        ("scope", endpoint::DEFAULT_SCOPE),
    ];

    let value = post_form(&client, &url, &form).await?;
    logged_in(client, api, tenant_id, value)
}

/// Sign a user in with the device code flow.
///
/// The sign-in instructions are logged on [`SIGN_IN_TARGET`], then the token endpoint is polled
/// at the interval the identity platform asks for until the user completes the sign-in or the
/// code expires.
pub async fn login_interactive(
    api: &model::Api,
    tenant_id: Option<&str>,
    client_id: &str,
) -> Result<model::LoggedInApi, Error> {
    let client = build_client(api)?;
    let tenant = tenant_id.unwrap_or(endpoint::ORGANIZATIONS);

    let form = [
        ("client_id", client_id),
        ("scope", endpoint::READ_DEVICES_SCOPE),
    ];
    let device_code = post_form(
        &client,
        &endpoint::authority(&api.authority_url, tenant, endpoint::DEVICE_CODE),
        &form,
    )
    .await
    .map(serde_json::from_value::<DeviceCodeResponse>)?
    .map_err(|e| Error::UnexpectedApiResponse(e.to_string()))?;

    log::warn!(target: SIGN_IN_TARGET, "{}", device_code.message);

    let token_url = endpoint::authority(&api.authority_url, tenant, endpoint::TOKEN);
    let deadline = Instant::now() + Duration::from_secs(device_code.expires_in);
    let mut interval = Duration::from_secs(device_code.interval);

    let form = [
        ("grant_type", endpoint::DEVICE_CODE_GRANT),
        ("client_id", client_id),
        ("device_code", device_code.device_code.as_str()),
    ];

    loop {
        tokio::time::sleep(interval).await;
        if Instant::now() >= deadline {
            return Err(Error::LoginError(format!(
                "device code {} expired before sign-in completed",
                device_code.user_code
            )));
        }

        match post_form(&client, &token_url, &form).await {
            Ok(value) => return logged_in(client, api, tenant, value),
            Err(Error::AuthorizationPending) => log::trace!("Waiting for sign-in"),
            Err(Error::SlowDown) => interval += SLOW_DOWN_STEP,
            Err(e) => return Err(e),
        }
    }
}

/// Release the session. Bearer tokens carry no server-side session, so this only drops the
/// token and connection pool.
pub fn logout(api: model::LoggedInApi) {
    log::debug!("Discarding access token for tenant {}", api.tenant);
    drop(api);
}

/// List all managed devices of the tenant, following `@odata.nextLink` until the last page.
pub async fn managed_devices(api: &model::LoggedInApi) -> Result<Vec<model::ManagedDevice>, Error> {
    let mut devices = Vec::new();
    let mut next = Some(endpoint::managed_devices(&api.graph_url));

    while let Some(url) = next.take() {
        let page = get(api, &url)
            .await
            .map(serde_json::from_value::<ManagedDevicesPage>)?
            .map_err(|e| Error::UnexpectedApiResponse(e.to_string()))?;

        log::debug!("Received page with {} devices", page.value.len());

        devices.extend(page.value.into_iter().map(model::ManagedDevice::from));
        next = page.next_link;
    }

    Ok(devices)
}

#[cfg(test)]
mod test {
    use super::{
        api, endpoint, login, login_interactive, managed_devices, map_response_status, Error,
    };
    use crate::model::LoggedInApi;
    use reqwest::StatusCode;
    use serde_json::{json, Value};
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN_PATH: &str = "/t1/oauth2/v2.0/token";
    const DEVICE_CODE_PATH: &str = "/t1/oauth2/v2.0/devicecode";
    const DEVICES_PATH: &str = "/v1.0/deviceManagement/managedDevices";

    fn mock_api(server: &MockServer) -> crate::model::Api {
        api(
            server.uri(),
            format!("{}/v1.0", server.uri()),
            Duration::from_secs(10),
        )
    }

    fn logged_in(server: &MockServer) -> LoggedInApi {
        LoggedInApi {
            graph_url: format!("{}/v1.0", server.uri()),
            tenant: "t1".to_string(),
            access_token: "token".to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn device(id: &str, name: Value) -> Value {
        json!({
            "deviceName": name,
            "id": id,
            "model": "X1",
            "lastSyncDateTime": "2024-01-01T00:00:00Z"
        })
    }

    fn device_code(expires_in: u64) -> Value {
        json!({
            "user_code": "FQK5HW3UF",
            "device_code": "device-code-1",
            "verification_uri": "https://microsoft.com/devicelogin",
            "expires_in": expires_in,
            "interval": 0,
            "message": "To sign in, enter the code FQK5HW3UF"
        })
    }

    fn token() -> Value {
        json!({"token_type": "Bearer", "expires_in": 3599, "access_token": "token"})
    }

    #[test]
    fn success_passes_value_through() {
        let value = json!({"value": []});
        assert_eq!(
            value,
            map_response_status(StatusCode::OK, value.clone()).unwrap()
        );
    }

    #[test]
    fn rejected_client_secret_is_login_error() {
        let value = json!({
            "error": "invalid_client",
            "error_description": "AADSTS7000215: Invalid client secret provided."
        });
        match map_response_status(StatusCode::UNAUTHORIZED, value) {
            Err(Error::LoginError(s)) => assert!(s.contains("invalid_client")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bad_request_from_token_endpoint_is_login_error() {
        let value = json!({
            "error": "invalid_request",
            "error_description": "AADSTS90002: Tenant 't1' not found."
        });
        assert!(matches!(
            map_response_status(StatusCode::BAD_REQUEST, value),
            Err(Error::LoginError(_))
        ));
    }

    #[test]
    fn device_flow_polling_signals() {
        let pending = json!({"error": "authorization_pending", "error_description": "pending"});
        let slow = json!({"error": "slow_down"});
        assert!(matches!(
            map_response_status(StatusCode::BAD_REQUEST, pending),
            Err(Error::AuthorizationPending)
        ));
        assert!(matches!(
            map_response_status(StatusCode::BAD_REQUEST, slow),
            Err(Error::SlowDown)
        ));
    }

    #[test]
    fn graph_forbidden() {
        let value = json!({"error": {"code": "Forbidden", "message": "Missing role"}});
        match map_response_status(StatusCode::FORBIDDEN, value) {
            Err(Error::Forbidden(s)) => assert!(s.contains("Missing role")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn throttled() {
        let value = json!({"error": {"code": "TooManyRequests", "message": null}});
        assert!(matches!(
            map_response_status(StatusCode::TOO_MANY_REQUESTS, value),
            Err(Error::RateExceeded(_))
        ));
    }

    #[test]
    fn unknown_error_body_is_api_error() {
        let value = json!("Service Unavailable");
        match map_response_status(StatusCode::SERVICE_UNAVAILABLE, value) {
            Err(Error::ApiError(s)) => assert!(s.starts_with("503")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn listing_follows_next_link() {
        let server = MockServer::start().await;
        let next_link = format!(
            "{}{}?$select={}&$skiptoken=page2",
            server.uri(),
            DEVICES_PATH,
            endpoint::MANAGED_DEVICE_SELECT
        );

        Mock::given(method("GET"))
            .and(path(DEVICES_PATH))
            .and(query_param("$skiptoken", "page2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"value": [device("3", json!("PC3"))]})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(DEVICES_PATH))
            .and(query_param("$select", endpoint::MANAGED_DEVICE_SELECT))
            .and(header("Authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "@odata.nextLink": next_link,
                "value": [device("1", json!("PC1")), device("2", Value::Null)]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let devices = managed_devices(&logged_in(&server)).await.unwrap();
        let ids: Vec<&str> = devices.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(vec!["1", "2", "3"], ids);
        assert_eq!(None, devices[1].device_name);
    }

    #[tokio::test]
    async fn listing_forbidden() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DEVICES_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_json(
                json!({"error": {"code": "Forbidden", "message": "Missing role"}}),
            ))
            .mount(&server)
            .await;

        assert!(matches!(
            managed_devices(&logged_in(&server)).await,
            Err(Error::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn client_credentials_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=app"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token()))
            .expect(1)
            .mount(&server)
            .await;

        let logged_in = login(&mock_api(&server), "t1", "app", "s3cret")
            .await
            .unwrap();
        assert_eq!("t1", logged_in.tenant);
        assert_eq!("token", logged_in.access_token);
    }

    #[tokio::test]
    async fn rejected_client_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid_client",
                "error_description": "AADSTS7000215: Invalid client secret provided."
            })))
            .mount(&server)
            .await;

        match login(&mock_api(&server), "t1", "app", "wrong").await {
            Err(Error::LoginError(s)) => assert!(s.contains("invalid_client")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn device_code_polling_waits_for_sign_in() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(DEVICE_CODE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(device_code(900)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "authorization_pending",
                "error_description": "AADSTS70016: pending"
            })))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "slow_down",
                "error_description": "AADSTS70000: slow down"
            })))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .and(body_string_contains("device_code=device-code-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token()))
            .expect(1)
            .mount(&server)
            .await;

        let logged_in = login_interactive(&mock_api(&server), Some("t1"), "public-client")
            .await
            .unwrap();
        assert_eq!("token", logged_in.access_token);
    }

    #[tokio::test]
    async fn expired_device_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(DEVICE_CODE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(device_code(0)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(token()))
            .expect(0)
            .mount(&server)
            .await;

        match login_interactive(&mock_api(&server), Some("t1"), "public-client").await {
            Err(Error::LoginError(s)) => assert!(s.contains("expired")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
