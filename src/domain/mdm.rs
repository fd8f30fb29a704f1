//! Rendering of the managed-deployment (MDM) configuration the WARP daemon
//! reads at startup.
//!
//! Credential values are inserted verbatim.

use crate::domain::inputs::Credentials;

/// On-disk format of the MDM file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MdmFormat {
    /// Bare `<dict>` document read from `mdm.xml` (linux, windows).
    XmlDict,
    /// Apple property list read from Managed Preferences (macOS).
    Plist,
}

/// Render the MDM document for the given format.
#[must_use]
pub fn render(format: MdmFormat, credentials: &Credentials) -> String {
    let dict = render_dict(credentials);
    match format {
        MdmFormat::XmlDict => dict,
        MdmFormat::Plist => format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \
             \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
             <plist version=\"1.0\">\n{dict}</plist>\n"
        ),
    }
}

fn render_dict(credentials: &Credentials) -> String {
    let mut entries = vec![
        ("organization", credentials.organization.as_str()),
        ("auth_client_id", credentials.auth_client_id.as_str()),
        ("auth_client_secret", credentials.auth_client_secret.as_str()),
    ];
    if let Some(id) = &credentials.unique_client_id {
        entries.push(("unique_client_id", id.as_str()));
    }

    let mut out = String::from("<dict>\n");
    for (key, value) in entries {
        out.push_str(&format!("  <key>{key}</key>\n  <string>{value}</string>\n"));
    }
    out.push_str("</dict>\n");
    out
}
