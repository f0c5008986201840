//! Connection settings and parameter validation messages

pub struct ConfigMessages {
    pub file_read_failed: &'static str,
    pub invalid_user: &'static str,
    pub invalid_vmid: &'static str,
    pub missing_required: &'static str,
    pub password_or_token_required: &'static str,
    pub token_pair_incomplete: &'static str,
}

pub const CONFIG_MESSAGES: ConfigMessages = ConfigMessages {
    file_read_failed: "Failed to load connection settings from {path}",
    invalid_user: "api_user '{user}' must be in the form user@realm",
    invalid_vmid: "vmid '{value}' is not a valid instance ID",
    missing_required: "missing required arguments: {fields}",
    password_or_token_required: "one of the following is required: api_password, api_token_id",
    token_pair_incomplete: "parameters are required together: api_token_id, api_token_secret",
};
