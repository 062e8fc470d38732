use crate::host::Host;

pub(crate) const FIELD_TITLE: usize = 0;
pub(crate) const FIELD_ADDRESS: usize = 1;
pub(crate) const FIELD_DESCRIPTION: usize = 2;
pub(crate) const FIELD_LOGIN: usize = 3;
pub(crate) const FIELD_PORT: usize = 4;
pub(crate) const FIELD_IDENTITY_FILE: usize = 5;
pub(crate) const FIELD_PASSWORD: usize = 6;
pub(crate) const FIELD_COUNT: usize = 7;

/// Accessor pair for one host attribute, addressed by field ordinal.
/// The form uses these to seed widgets from a record and to copy
/// widget values back on save.
pub(crate) struct FieldBinding {
    pub(crate) label: &'static str,
    pub(crate) get: fn(&Host) -> String,
    pub(crate) set: fn(&mut Host, String),
}

pub(crate) const BINDINGS: [FieldBinding; FIELD_COUNT] = [
    FieldBinding {
        label: "Title",
        get: |h| h.title.clone(),
        set: |h, v| h.title = v,
    },
    FieldBinding {
        label: "Host",
        get: |h| h.address.clone(),
        set: |h, v| h.address = v,
    },
    FieldBinding {
        label: "Description",
        get: |h| h.description.clone(),
        set: |h, v| h.description = v,
    },
    FieldBinding {
        label: "Login",
        get: |h| h.login.clone(),
        set: |h, v| h.login = v,
    },
    FieldBinding {
        label: "Network port",
        get: |h| h.port.clone(),
        set: |h, v| h.port = v,
    },
    FieldBinding {
        label: "Identity file",
        get: |h| h.identity_file.clone(),
        set: |h, v| h.identity_file = v,
    },
    FieldBinding {
        label: "Password",
        get: |h| h.password.clone(),
        set: |h, v| h.password = v,
    },
];
