//! # Template Resolution
//!
//! Resolves a `templateId` to its stored `(providerId, endpointId,
//! parameters)` triple for `Short`/`Regular`
//! requests. Templates are created once, off this engine's pipeline, by a
//! `createTemplate` call the chain observes independently; this component
//! treats the template set as an opaque lookup via [`TemplateSource`].
//!
//! For `Short` requests only the template reference and client are known
//! at request time — the fulfillment
//! routing fields (`designatedWallet`, `fulfillAddress`,
//! `fulfillFunctionId`, `requesterIndex`) have to come from somewhere
//! before the transaction assembler can use them. The upstream Airnode
//! protocol fixes those fields at template-creation time alongside the
//! endpoint and parameters; this engine follows that and stores them on
//! [`Template`] rather than inventing a second resolution step (see
//! DESIGN.md "Template shape").

use ac_03_parameter_codec::{decode_parameters, merge_over_template};
use ac_types::{
    ApiCallRequest, EndpointId, Log, RequestErrorCode, RequestKind, RequestStatus, RequesterIndex,
    TemplateId,
};

/// A stored template, looked up by [`TemplateSource`].
#[derive(Debug, Clone)]
pub struct Template {
    /// Endpoint this template targets.
    pub endpoint_id: EndpointId,
    /// Requester index the template was created under.
    pub requester_index: RequesterIndex,
    /// Wallet expected to submit the fulfill transaction.
    pub designated_wallet: String,
    /// Address the fulfill transaction calls back into.
    pub fulfill_address: String,
    /// 4-byte selector the fulfill transaction calls.
    pub fulfill_function_id: [u8; 4],
    /// Tagged-parameter blob fixed at template creation time.
    pub encoded_parameters: Vec<u8>,
}

/// Resolves a `templateId` to its stored [`Template`]. Backed by a chain
/// view call in production; tests use an in-memory table.
pub trait TemplateSource {
    /// Look up a template by id, or `None` if it was never created.
    fn get(&self, template_id: &TemplateId) -> Option<Template>;
}

/// Resolve every `Short`/`Regular` request's `templateId` in place. `Full`
/// requests carry no template and are left untouched. Requests not in
/// `Pending` status (e.g. already `Errored` by the parameter codec) are
/// skipped, since the error is already terminal.
pub fn resolve_templates(requests: &mut [ApiCallRequest], source: &dyn TemplateSource) -> Vec<Log> {
    let mut logs = Vec::new();

    for request in requests.iter_mut() {
        if request.status != RequestStatus::Pending {
            continue;
        }
        let Some(template_id) = request.template_id else {
            continue;
        };

        let Some(template) = source.get(&template_id) else {
            request.status = RequestStatus::Errored;
            request.error_code = Some(RequestErrorCode::TemplateNotFound);
            let log = Log::error(
                format!("template {template_id} not found for request {}", request.id),
                None,
            );
            log.emit();
            logs.push(log);
            continue;
        };

        let template_parameters = match decode_parameters(&template.encoded_parameters) {
            Ok(params) => params,
            Err(err) => {
                request.status = RequestStatus::Errored;
                request.error_code = Some(RequestErrorCode::TemplateParameterDecodingFailed);
                let log = Log::error(
                    format!(
                        "template {template_id} parameters failed to decode for request {}: {err}",
                        request.id
                    ),
                    Some(err.to_string()),
                );
                log.emit();
                logs.push(log);
                continue;
            }
        };

        request.endpoint_id = Some(template.endpoint_id);

        match request.kind {
            RequestKind::Short => {
                request.requester_index = Some(template.requester_index);
                request.designated_wallet = Some(template.designated_wallet.clone());
                request.fulfill_address = Some(template.fulfill_address.clone());
                request.fulfill_function_id = Some(template.fulfill_function_id);
                request.parameters = template_parameters;
            }
            RequestKind::Regular => {
                request.parameters = merge_over_template(&template_parameters, &request.parameters);
            }
            RequestKind::Full => {}
        }

        if request.designated_wallet.is_none()
            || request.fulfill_address.is_none()
            || request.fulfill_function_id.is_none()
        {
            request.status = RequestStatus::Errored;
            request.error_code = Some(RequestErrorCode::InsufficientParameters);
        }
    }

    logs
}
