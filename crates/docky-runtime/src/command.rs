/// Structured arguments for launching a container.
///
/// Values are passed to the engine as separate argv entries, never through a
/// shell. Port strings are passed through uninterpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArgs {
    pub name: String,
    pub volumes_from: Option<String>,
    pub ports: Vec<String>,
    pub env: Vec<String>,
    pub links: Vec<String>,
    pub image: String,
}

impl RunArgs {
    pub fn new(name: &str, image: &str) -> Self {
        Self {
            name: name.to_owned(),
            image: image.to_owned(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn volumes_from(mut self, source: Option<String>) -> Self {
        self.volumes_from = source;
        self
    }

    #[must_use]
    pub fn ports(mut self, ports: Vec<String>) -> Self {
        self.ports = ports;
        self
    }

    #[must_use]
    pub fn env(mut self, env: Vec<String>) -> Self {
        self.env = env;
        self
    }

    #[must_use]
    pub fn links(mut self, links: Vec<String>) -> Self {
        self.links = links;
        self
    }

    /// Engine argv, starting at the `run` subcommand.
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = ["run", "-d", "-i", "-t", "--name"]
            .iter()
            .map(|s| (*s).to_owned())
            .collect();
        args.push(self.name.clone());

        if let Some(source) = &self.volumes_from {
            args.push("--volumes-from".to_owned());
            args.push(source.clone());
        }
        for port in &self.ports {
            args.push("-p".to_owned());
            args.push(port.clone());
        }
        for pair in &self.env {
            args.push("-e".to_owned());
            args.push(pair.clone());
        }
        for link in &self.links {
            args.push("--link".to_owned());
            args.push(link.clone());
        }
        args.push(self.image.clone());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_run_args() {
        let args = RunArgs::new("web", "nginx").to_args();
        assert_eq!(args, vec!["run", "-d", "-i", "-t", "--name", "web", "nginx"]);
    }

    #[test]
    fn flags_are_ordered_volumes_ports_env_links_image() {
        let args = RunArgs::new("web", "app:v1")
            .volumes_from(Some("web-data".to_owned()))
            .ports(vec!["80".to_owned(), "127.0.0.1:8443:443".to_owned()])
            .env(vec!["A=1".to_owned()])
            .links(vec!["db:database".to_owned()])
            .to_args();

        assert_eq!(
            args,
            vec![
                "run",
                "-d",
                "-i",
                "-t",
                "--name",
                "web",
                "--volumes-from",
                "web-data",
                "-p",
                "80",
                "-p",
                "127.0.0.1:8443:443",
                "-e",
                "A=1",
                "--link",
                "db:database",
                "app:v1",
            ]
        );
    }

    #[test]
    fn values_with_shell_metacharacters_stay_single_arguments() {
        let args = RunArgs::new("web", "nginx")
            .env(vec!["MSG=hello; rm -rf /".to_owned()])
            .to_args();
        assert!(args.contains(&"MSG=hello; rm -rf /".to_owned()));
    }
}
