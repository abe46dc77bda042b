//! Reusable test content.

/// Template using only built-in Tera features
pub const SIMPLE_TEMPLATE: &str = "listen {{ 8000 + 80 }};\nname {{ \"app\" | upper }};\n";

/// `SIMPLE_TEMPLATE` after rendering
pub const SIMPLE_RENDERED: &str = "listen 8080;\nname APP;\n";

/// Template without any markers
pub const LITERAL_TEMPLATE: &str = "server {\n  root /srv/www;\n}\n\n";

/// Fake `aws` body answering `ssm get-parameter` for `/app/user`
pub const FAKE_AWS_SSM: &str = r#"case "$*" in
  *"get-parameter --name /app/user"*)
    printf '{"Parameter":{"Name":"/app/user","Type":"SecureString","Value":"admin"}}'
    ;;
  *"get-parameter --name"*)
    echo "An error occurred (ParameterNotFound) when calling the GetParameter operation:" >&2
    exit 254
    ;;
  *)
    echo "unexpected call: $*" >&2
    exit 2
    ;;
esac"#;
