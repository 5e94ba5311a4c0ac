use tracing::debug;
use tracing::error;

use super::Agent;
use crate::proto::gnmi::GetRequest;
use crate::proto::gnmi::GetResponse;
use crate::proto::gnmi::SetRequest;
use crate::proto::gnmi::SetResponse;
use crate::Result;

impl Agent {
    /// Sends a gNMI `Get` to the management server.
    ///
    /// Requests are usually built with [`crate::get_request`].
    pub async fn gnmi_get(
        &self,
        req: GetRequest,
    ) -> Result<GetResponse> {
        let resp = self.query()?.get(req).await.inspect_err(|e| {
            error!("failed executing gNMI get request: {}", e);
        })?;

        debug!("gNMI get response: {:?}", resp);
        Ok(resp)
    }

    /// Sends a gNMI `Set` to the management server.
    ///
    /// See [`crate::set_update_request`], [`crate::set_replace_request`] and
    /// [`crate::set_delete_request`].
    pub async fn gnmi_set(
        &self,
        req: SetRequest,
    ) -> Result<SetResponse> {
        let resp = self.query()?.set(req).await.inspect_err(|e| {
            error!("failed executing gNMI set request: {}", e);
        })?;

        debug!("gNMI set response: {:?}", resp);
        Ok(resp)
    }
}
