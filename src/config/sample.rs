// Sample configuration printed by `--genconfig`

pub const SAMPLE_CONFIG: &str = r#"# rxstatic sample configuration
#
# rxstatic --genconfig > config.toml
#
# Every key can be overridden from the environment, e.g.
#   RXSTATIC_SERVER__PORT=9000

[server]
host = "127.0.0.1"
port = 8080
# workers = 4
backlog = 128

# enable HTTPS, set tls = true
tls = false
# certificate chain for HTTPS connections
# certfile = "./priv/cert.pem"
# private key for HTTPS connections
# keyfile = "./priv/key.pem"

[logging]
level = "info"
access_log = true
# combined, common or json
access_log_format = "combined"
# access_log_file = "./logs/access.log"
# error_log_file = "./logs/error.log"

[performance]
keep_alive_timeout = 75
read_timeout = 30
write_timeout = 30
# max_connections = 1024

# Routes are tried from the highest priority down; routes with equal
# priority keep their order from this file. A pattern only has to match
# the beginning of the request path.

# every documentation page is answered by the same single-page app
[[route]]
pattern = "/(api|guide|misc|tutorial|error)"
path = "/srv/angular/docs/index.html"
filealias = true
priority = 20

[[route]]
pattern = "/angular.*js"
path = "/srv/angular/"
priority = 10

# catch-all: index.html when present, else the listing template
[[route]]
pattern = "/"
path = "/srv/angular/docs"
findindex = true
useindex = "./templates/listing.html"
priority = 0
"#;
