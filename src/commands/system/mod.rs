pub mod clip;
pub mod confirm;
pub mod env;
pub mod exec;
pub mod free;
pub mod kill;
pub mod logger;
pub mod lsof;
pub mod mknod;
pub mod pipe;
pub mod ps;
pub mod pwd;
pub mod random;
pub mod ratelimit;
pub mod script;
pub mod sleep;
pub mod stty;
pub mod sync;
pub mod timeout;
pub mod uname;
pub mod uptime;
pub mod watch;
pub mod which;
