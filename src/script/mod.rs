//! Line-oriented declaration scripts.
//!
//! Each non-empty line is one command; `#` starts a comment.
//!
//! ```text
//! opt all_hosts
//! net Private 10.0.1.0/24 scope=private
//! host a role=router
//! nic a_priv 10.0.1.1
//! nic a_pub 127.0.0.1 scope=public
//! nohost
//! ```

mod tokens;

use crate::error::{Error, Result};
use crate::models::{parse_address, NetId, Prefix};
use crate::output::RenderOptions;
use crate::topology::{HostToken, Topology};
use colored::Colorize;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub use tokens::{split_and_strip, strip_comment, to_info};

/// Whether to keep reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Applies declaration commands to a [`Topology`].
///
/// Diagnostic `show` output goes to `out`.
pub struct Interpreter<W: Write> {
    topology: Topology,
    options: RenderOptions,
    host: Option<HostToken>,
    out: W,
    line: usize,
    /// Files currently being loaded, outermost first.
    loading: Vec<PathBuf>,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Interpreter<W> {
        Interpreter::with_topology(Topology::new(), out)
    }

    pub fn with_topology(topology: Topology, out: W) -> Interpreter<W> {
        Interpreter {
            topology,
            options: RenderOptions::default(),
            host: None,
            out,
            line: 0,
            loading: Vec::new(),
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Close any open host scope and hand back the model and render options.
    pub fn finish(mut self) -> (Topology, RenderOptions) {
        self.close_host();
        (self.topology, self.options)
    }

    /// Run every line of `input` until it ends or an `EOF` command.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        for line in input.lines() {
            if self.run_line(&line?)? == Flow::Stop {
                break;
            }
        }
        Ok(())
    }

    /// Run the declarations in the file at `path`.
    ///
    /// # Errors
    /// [`Error::Declaration`] if `path` is already being loaded further up,
    /// directly or through other files.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        log::info!("Loading declarations from {}", path.display());
        let file = File::open(path)?;
        let canonical = path.canonicalize()?;
        if self.loading.contains(&canonical) {
            return Err(self.malformed(&format!(
                "{} is already being loaded",
                path.display()
            )));
        }

        self.loading.push(canonical);
        let saved = std::mem::replace(&mut self.line, 0);
        let result = self.run(BufReader::new(file));
        self.line = saved;
        self.loading.pop();
        result
    }

    /// Run a single command line.
    pub fn run_line(&mut self, line: &str) -> Result<Flow> {
        self.line += 1;
        let words = split_and_strip(strip_comment(line));
        let args: Vec<&str> = words.iter().map(String::as_str).collect();
        let Some((&command, args)) = args.split_first() else {
            return Ok(Flow::Continue);
        };
        log::trace!("line {}: {command} {args:?}", self.line);

        let result = match command {
            "opt" => {
                self.options.apply(&to_info(args.iter().copied()));
                Ok(())
            }
            "net" => self.do_net(args),
            "host" => self.do_host(args),
            "nohost" => {
                self.close_host();
                Ok(())
            }
            "nic" => self.do_nic(args),
            "show" => self.do_show(args),
            "load" => match args.first() {
                Some(path) => self.load(path),
                None => Err(self.malformed("load needs a file name")),
            },
            "EOF" => return Ok(Flow::Stop),
            _ => {
                log::warn!("line {}: unknown command '{command}'", self.line);
                Ok(())
            }
        };

        if let Err(e) = &result {
            log::error!("line {}: {e}", self.line);
        }
        result.map(|()| Flow::Continue)
    }

    fn malformed(&self, message: &str) -> Error {
        Error::Declaration {
            line: self.line,
            message: message.to_string(),
        }
    }

    fn close_host(&mut self) {
        if let Some(token) = self.host.take() {
            self.topology.end_host(token);
        }
    }

    /// `net NAME PREFIX [key=value]...`
    fn do_net(&mut self, args: &[&str]) -> Result<()> {
        let [name, prefix, rest @ ..] = args else {
            return Err(self.malformed("usage: net NAME PREFIX [key=value]..."));
        };
        let prefix: Prefix = prefix.parse()?;
        let id = self.topology.declare_subnet(prefix, Some(*name))?;
        self.topology
            .net_mut(id)
            .info
            .extend(to_info(rest.iter().copied()));
        Ok(())
    }

    /// `host NAME [key=value]...`
    fn do_host(&mut self, args: &[&str]) -> Result<()> {
        let [name, rest @ ..] = args else {
            return Err(self.malformed("usage: host NAME [key=value]..."));
        };
        self.close_host();
        let token = self.topology.begin_host(name);
        self.topology
            .host_mut(token.host())
            .info
            .extend(to_info(rest.iter().copied()));
        self.host = Some(token);
        Ok(())
    }

    /// `nic NAME ADDRESS [key=value]...`
    fn do_nic(&mut self, args: &[&str]) -> Result<()> {
        let [name, address, rest @ ..] = args else {
            return Err(self.malformed("usage: nic NAME ADDRESS [key=value]..."));
        };
        let address = parse_address(address)?;
        let id = self.topology.add_nic(address, Some(*name))?;
        self.topology
            .nic_mut(id)
            .info
            .extend(to_info(rest.iter().copied()));
        Ok(())
    }

    /// `show host NAME`, `show net` or `show json`
    fn do_show(&mut self, args: &[&str]) -> Result<()> {
        match args {
            ["host", name, ..] => self.show_host(name),
            ["net", ..] => self.show_net(self.topology.root(), 0),
            ["json", ..] | ["root", ..] => {
                serde_json::to_writer_pretty(&mut self.out, &self.topology.snapshot())
                    .map_err(std::io::Error::from)?;
                writeln!(self.out)?;
                Ok(())
            }
            _ => Err(self.malformed("usage: show host NAME | show net | show json")),
        }
    }

    fn show_host(&mut self, name: &str) -> Result<()> {
        let topology = &self.topology;
        let Some(id) = topology.host_by_name(name) else {
            writeln!(self.out, "{}: no such host", name.red())?;
            return Ok(());
        };
        let host = topology.host(id);
        writeln!(self.out, "{} {:?}", host.name.cyan(), host.info)?;
        for &nic in host.nics() {
            let nic = topology.nic(nic);
            writeln!(
                self.out,
                "\t{}: {} in {} {:?}",
                nic.address,
                nic.name.as_deref().unwrap_or("-"),
                topology.net(nic.net()),
                nic.info
            )?;
        }
        Ok(())
    }

    fn show_net(&mut self, id: NetId, depth: usize) -> Result<()> {
        let topology = &self.topology;
        let indent = "\t".repeat(depth);
        let net = topology.net(id);
        writeln!(
            self.out,
            "{indent}{}: {}",
            net.prefix.to_string().bold(),
            net.name.as_deref().unwrap_or("None").green()
        )?;
        for &nic in net.nics() {
            let nic = topology.nic(nic);
            let host = nic
                .host()
                .map_or("None", |h| topology.host(h).name.as_str());
            writeln!(
                self.out,
                "{indent}\t{}: {}@{}",
                nic.address,
                nic.name.as_deref().unwrap_or("None"),
                host.cyan()
            )?;
        }
        let children = net.children().to_vec();
        for child in children {
            self.show_net(child, depth + 1)?;
        }
        Ok(())
    }
}
