use crate::VendorCredentials;

/// Vendor pack tags the agent may suggest. Unknown tags are retained for
/// display but drive no credential section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorTag {
    Fortigate,
    CiscoIos,
}

impl VendorTag {
    pub fn from_wire(tag: &str) -> Option<Self> {
        match tag {
            "fortigate" => Some(VendorTag::Fortigate),
            "cisco_ios" => Some(VendorTag::CiscoIos),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VendorTag::Fortigate => "FortiGate",
            VendorTag::CiscoIos => "Cisco IOS",
        }
    }
}

/// Where the credential-gated follow-up stands for the current run lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VendorStage {
    /// No suggestions; the vendor card is hidden.
    #[default]
    Idle,
    /// Suggestions present, prompt closed.
    Suggested,
    /// Credential prompt is open.
    Prompting,
    /// Credentials accepted; vendor checks running server-side.
    Submitted,
    /// Summaries or findings have arrived.
    Summarized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorField {
    FortiHost,
    FortiUser,
    FortiPass,
    CiscoHost,
    CiscoUser,
    CiscoPass,
    CiscoSecret,
    CiscoPort,
}

/// Raw prompt field values. The port stays free text until submit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VendorForm {
    pub forti_host: String,
    pub forti_user: String,
    pub forti_pass: String,
    pub cisco_host: String,
    pub cisco_user: String,
    pub cisco_pass: String,
    pub cisco_secret: String,
    pub cisco_port: String,
}

impl VendorForm {
    pub fn set(&mut self, field: VendorField, value: String) {
        match field {
            VendorField::FortiHost => self.forti_host = value,
            VendorField::FortiUser => self.forti_user = value,
            VendorField::FortiPass => self.forti_pass = value,
            VendorField::CiscoHost => self.cisco_host = value,
            VendorField::CiscoUser => self.cisco_user = value,
            VendorField::CiscoPass => self.cisco_pass = value,
            VendorField::CiscoSecret => self.cisco_secret = value,
            VendorField::CiscoPort => self.cisco_port = value,
        }
    }

    fn forti_touched(&self) -> bool {
        [&self.forti_host, &self.forti_user, &self.forti_pass]
            .iter()
            .any(|v| !v.trim().is_empty())
    }

    fn forti_complete(&self) -> bool {
        [&self.forti_host, &self.forti_user, &self.forti_pass]
            .iter()
            .all(|v| !v.trim().is_empty())
    }

    fn cisco_touched(&self) -> bool {
        [
            &self.cisco_host,
            &self.cisco_user,
            &self.cisco_pass,
            &self.cisco_secret,
            &self.cisco_port,
        ]
        .iter()
        .any(|v| !v.trim().is_empty())
    }

    fn cisco_required_complete(&self) -> bool {
        [&self.cisco_host, &self.cisco_user, &self.cisco_pass]
            .iter()
            .all(|v| !v.trim().is_empty())
    }

    /// Drops values for sections the current suggestions do not cover.
    pub fn clear_unsuggested(&mut self, suggestions: &[String]) {
        if !section_suggested(suggestions, VendorTag::Fortigate) {
            self.forti_host.clear();
            self.forti_user.clear();
            self.forti_pass.clear();
        }
        if !section_suggested(suggestions, VendorTag::CiscoIos) {
            self.cisco_host.clear();
            self.cisco_user.clear();
            self.cisco_pass.clear();
            self.cisco_secret.clear();
            self.cisco_port.clear();
        }
    }
}

/// Credential workflow for the current run lineage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VendorWorkflow {
    pub stage: VendorStage,
    pub suggestions: Vec<String>,
    /// The one-time automatic prompt has been consumed for this lineage.
    pub prompt_shown: bool,
    pub form: VendorForm,
    pub error: String,
    pub submitting: bool,
}

pub const VENDOR_FORTI_INCOMPLETE: &str = "FortiGate section needs host, user, and password.";
pub const VENDOR_CISCO_INCOMPLETE: &str = "Cisco IOS section needs host, user, and password.";
pub const VENDOR_BAD_PORT: &str = "Cisco IOS port must be a number between 1 and 65535.";
pub const VENDOR_NO_SECTION: &str = "Enter credentials for at least one suggested vendor.";

pub fn section_suggested(suggestions: &[String], tag: VendorTag) -> bool {
    suggestions
        .iter()
        .any(|s| VendorTag::from_wire(s) == Some(tag))
}

/// Pre-validates the form against the current suggestions and builds the
/// submission body. Only suggested, touched sections are considered; a
/// touched section must be complete, and at least one section must be.
pub fn validate_submission(
    form: &VendorForm,
    suggestions: &[String],
) -> Result<VendorCredentials, String> {
    let mut creds = VendorCredentials::default();
    let mut any_complete = false;

    if section_suggested(suggestions, VendorTag::Fortigate) && form.forti_touched() {
        if !form.forti_complete() {
            return Err(VENDOR_FORTI_INCOMPLETE.to_string());
        }
        creds.forti_host = form.forti_host.trim().to_string();
        creds.forti_user = form.forti_user.trim().to_string();
        creds.forti_pass = form.forti_pass.trim().to_string();
        any_complete = true;
    }

    if section_suggested(suggestions, VendorTag::CiscoIos) && form.cisco_touched() {
        if !form.cisco_required_complete() {
            return Err(VENDOR_CISCO_INCOMPLETE.to_string());
        }
        creds.cisco_port = parse_port(&form.cisco_port)?;
        creds.cisco_host = form.cisco_host.trim().to_string();
        creds.cisco_user = form.cisco_user.trim().to_string();
        creds.cisco_pass = form.cisco_pass.trim().to_string();
        creds.cisco_secret = form.cisco_secret.trim().to_string();
        any_complete = true;
    }

    if !any_complete {
        return Err(VENDOR_NO_SECTION.to_string());
    }
    Ok(creds)
}

fn parse_port(raw: &str) -> Result<u16, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    match raw.parse::<u16>() {
        Ok(port) if port >= 1 => Ok(port),
        _ => Err(VENDOR_BAD_PORT.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both_suggested() -> Vec<String> {
        vec!["fortigate".to_string(), "cisco_ios".to_string()]
    }

    fn complete_forti_form() -> VendorForm {
        VendorForm {
            forti_host: "10.0.0.1".into(),
            forti_user: "admin".into(),
            forti_pass: "secret".into(),
            ..VendorForm::default()
        }
    }

    #[test]
    fn untouched_sections_are_rejected() {
        let err = validate_submission(&VendorForm::default(), &both_suggested()).unwrap_err();
        assert_eq!(err, VENDOR_NO_SECTION);
    }

    #[test]
    fn partial_section_names_the_section() {
        let form = VendorForm {
            forti_host: "10.0.0.1".into(),
            ..VendorForm::default()
        };
        let err = validate_submission(&form, &both_suggested()).unwrap_err();
        assert_eq!(err, VENDOR_FORTI_INCOMPLETE);
    }

    #[test]
    fn complete_section_builds_credentials() {
        let creds = validate_submission(&complete_forti_form(), &both_suggested()).unwrap();
        assert_eq!(creds.forti_host, "10.0.0.1");
        assert_eq!(creds.forti_user, "admin");
        assert!(creds.cisco_host.is_empty());
    }

    #[test]
    fn unsuggested_section_is_ignored() {
        // Only Cisco is suggested; the filled FortiGate section neither
        // completes the submission nor triggers its own validation.
        let err =
            validate_submission(&complete_forti_form(), &["cisco_ios".to_string()]).unwrap_err();
        assert_eq!(err, VENDOR_NO_SECTION);
    }

    #[test]
    fn cisco_port_bounds_are_enforced() {
        let mut form = VendorForm {
            cisco_host: "10.0.0.2".into(),
            cisco_user: "admin".into(),
            cisco_pass: "secret".into(),
            cisco_port: "0".into(),
            ..VendorForm::default()
        };
        let err = validate_submission(&form, &both_suggested()).unwrap_err();
        assert_eq!(err, VENDOR_BAD_PORT);

        form.cisco_port = "70000".into();
        let err = validate_submission(&form, &both_suggested()).unwrap_err();
        assert_eq!(err, VENDOR_BAD_PORT);

        form.cisco_port = "2022".into();
        let creds = validate_submission(&form, &both_suggested()).unwrap();
        assert_eq!(creds.cisco_port, 2022);

        form.cisco_port = String::new();
        let creds = validate_submission(&form, &both_suggested()).unwrap();
        assert_eq!(creds.cisco_port, 0);
    }

    #[test]
    fn clear_unsuggested_drops_hidden_fields() {
        let mut form = complete_forti_form();
        form.cisco_host = "10.0.0.2".into();
        form.clear_unsuggested(&["cisco_ios".to_string()]);
        assert!(form.forti_host.is_empty());
        assert!(form.forti_pass.is_empty());
        assert_eq!(form.cisco_host, "10.0.0.2");
    }
}
