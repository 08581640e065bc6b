pub mod arp;
pub mod curl;
pub mod dns;
pub mod ifconfig;
pub mod iprange;
pub mod nc;
pub mod netstat;
pub mod ping;
pub mod telnet;
pub mod wget;
