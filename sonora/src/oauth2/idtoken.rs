use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use crate::oauth2::{config::GOOGLE_ISSUERS, errors::OAuth2Error, types::IdTokenClaims};

/// Decodes an ID token received directly from the token endpoint over TLS, checking
/// audience, issuer and expiry.
///
/// The signature is not checked: the token never passed through the browser, so the TLS
/// channel to the token endpoint authenticates it.
pub(super) fn decode_google_id_token(
    id_token: &str,
    client_id: &str,
) -> Result<IdTokenClaims, OAuth2Error> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.set_audience(&[client_id]);
    validation.set_issuer(&GOOGLE_ISSUERS);

    let data = decode::<IdTokenClaims>(id_token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| OAuth2Error::IdToken(e.to_string()))?;

    Ok(data.claims)
}
