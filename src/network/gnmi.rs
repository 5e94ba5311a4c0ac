use std::time::Duration;

use tonic::metadata::Ascii;
use tonic::metadata::MetadataValue;
use tonic::service::interceptor::InterceptedService;
use tonic::service::Interceptor;
use tonic::transport::Channel;
use tonic::transport::Endpoint;
use tonic::Request;
use tonic::Status;
use tracing::debug;

use super::ConfigQuery;
use crate::path::parse_elems;
use crate::proto::gnmi::g_nmi_client::GNmiClient;
use crate::proto::gnmi::get_request::DataType;
use crate::proto::gnmi::typed_value::Value;
use crate::proto::gnmi::Encoding;
use crate::proto::gnmi::GetRequest;
use crate::proto::gnmi::GetResponse;
use crate::proto::gnmi::Path;
use crate::proto::gnmi::PathElem;
use crate::proto::gnmi::SetRequest;
use crate::proto::gnmi::SetResponse;
use crate::proto::gnmi::TypedValue;
use crate::proto::gnmi::Update;
use crate::GnmiConfig;
use crate::NetworkError;
use crate::Result;

/// Attaches the fixed gNMI credentials to every request.
#[derive(Clone)]
pub struct CredentialsInterceptor {
    username: MetadataValue<Ascii>,
    password: MetadataValue<Ascii>,
}

impl CredentialsInterceptor {
    pub fn new(
        username: &str,
        password: &str,
    ) -> Result<Self> {
        Ok(Self {
            username: MetadataValue::try_from(username).map_err(|_| NetworkError::InvalidMetadata("username"))?,
            password: MetadataValue::try_from(password).map_err(|_| NetworkError::InvalidMetadata("password"))?,
        })
    }
}

impl Interceptor for CredentialsInterceptor {
    fn call(
        &mut self,
        mut request: Request<()>,
    ) -> std::result::Result<Request<()>, Status> {
        let metadata = request.metadata_mut();
        metadata.insert("username", self.username.clone());
        metadata.insert("password", self.password.clone());
        Ok(request)
    }
}

/// [`ConfigQuery`] backed by the management server's gNMI service.
#[derive(Clone)]
pub struct GnmiConfigQuery {
    client: GNmiClient<InterceptedService<Channel, CredentialsInterceptor>>,
}

impl GnmiConfigQuery {
    /// Creates the query client without dialing; the channel connects on
    /// first use.
    pub fn connect_lazy(settings: &GnmiConfig) -> Result<Self> {
        let endpoint = Endpoint::try_from(settings.address.clone())
            .map_err(|_| NetworkError::InvalidURI(settings.address.clone()))?;
        let channel = endpoint
            .connect_timeout(Duration::from_millis(settings.connect_timeout_in_ms))
            .timeout(Duration::from_millis(settings.request_timeout_in_ms))
            .connect_lazy();

        Self::from_channel(channel, settings)
    }

    pub fn from_channel(
        channel: Channel,
        settings: &GnmiConfig,
    ) -> Result<Self> {
        let interceptor = CredentialsInterceptor::new(&settings.username, &settings.password)?;
        Ok(Self {
            client: GNmiClient::with_interceptor(channel, interceptor),
        })
    }
}

/// Builds a structured gNMI path from an XPath.
pub(crate) fn gnmi_path(xpath: &str) -> Path {
    Path {
        elem: parse_elems(xpath)
            .into_iter()
            .map(|e| PathElem {
                name: e.name,
                key: e.keys.into_iter().collect(),
            })
            .collect(),
        ..Default::default()
    }
}

/// Get request for `path` with the given data type filter and encoding.
pub fn get_request(
    path: &str,
    data_type: DataType,
    encoding: Encoding,
) -> GetRequest {
    GetRequest {
        prefix: None,
        path: vec![gnmi_path(path)],
        r#type: data_type as i32,
        encoding: encoding as i32,
    }
}

/// Set request merging `value` into the node at `path`.
///
/// Fails with [`NetworkError::EmptyGnmiValue`] when `value` carries nothing.
pub fn set_update_request(
    path: &str,
    value: TypedValue,
) -> Result<SetRequest> {
    Ok(SetRequest {
        update: vec![path_update(path, value)?],
        ..Default::default()
    })
}

/// Set request replacing the node at `path` with `value`.
pub fn set_replace_request(
    path: &str,
    value: TypedValue,
) -> Result<SetRequest> {
    Ok(SetRequest {
        replace: vec![path_update(path, value)?],
        ..Default::default()
    })
}

/// Set request deleting every value under `path`.
pub fn set_delete_request(path: &str) -> SetRequest {
    SetRequest {
        delete: vec![gnmi_path(path)],
        ..Default::default()
    }
}

pub fn json_ietf_value(json: &str) -> TypedValue {
    TypedValue {
        value: Some(Value::JsonIetfVal(json.as_bytes().to_vec())),
    }
}

fn path_update(
    path: &str,
    value: TypedValue,
) -> Result<Update> {
    if value.value.is_none() {
        return Err(NetworkError::EmptyGnmiValue.into());
    }
    Ok(Update {
        path: Some(gnmi_path(path)),
        val: Some(value),
        duplicates: 0,
    })
}

/// Extracts the JSON-IETF value of the first update of the first
/// notification.
pub(crate) fn first_json_ietf(resp: GetResponse) -> Option<String> {
    let update = resp.notification.into_iter().next()?.update.into_iter().next()?;
    match update.val?.value? {
        Value::JsonIetfVal(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        other => {
            debug!("unexpected gNMI value type: {:?}", other);
            None
        }
    }
}

#[tonic::async_trait]
impl ConfigQuery for GnmiConfigQuery {
    async fn get(
        &self,
        req: GetRequest,
    ) -> Result<GetResponse> {
        let resp = self.client.clone().get(req).await?;
        Ok(resp.into_inner())
    }

    async fn set(
        &self,
        req: SetRequest,
    ) -> Result<SetResponse> {
        let resp = self.client.clone().set(req).await?;
        Ok(resp.into_inner())
    }

    async fn get_config(
        &self,
        path: &str,
    ) -> Result<Option<String>> {
        debug!(path, "gNMI get");
        let resp = self.get(get_request(path, DataType::Config, Encoding::JsonIetf)).await?;
        Ok(first_json_ietf(resp))
    }
}
