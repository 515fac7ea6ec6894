//! Provider error-code vocabulary shared between the sign-up core and the
//! concrete identity clients.

/// Code the identity provider reports when the email is already registered.
pub const ERROR_CODE_ACCOUNT_EXISTS: &str = "auth/email-already-in-use";

/// Code reported for a malformed email address.
pub const ERROR_CODE_INVALID_EMAIL: &str = "auth/invalid-email";

/// Code reported when the password does not meet the provider's minimum.
pub const ERROR_CODE_WEAK_PASSWORD: &str = "auth/weak-password";

/// Message shown in place of the raw provider message for
/// [`ERROR_CODE_ACCOUNT_EXISTS`].
pub const ERROR_MSG_ACCOUNT_EXISTS: &str = "An account with this E-Mail address already exists. \
    Try to login with this account instead. If you think the account is already used from one \
    of the social logins, try to sign in with one of them. Afterward, associate your accounts \
    on your personal account page.";
