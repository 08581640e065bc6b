pub mod basename;
pub mod chmod;
pub mod chown;
pub mod cp;
pub mod df;
pub mod dir;
pub mod dirname;
pub mod dirsize;
pub mod du;
pub mod fileage;
pub mod filehead;
pub mod find;
pub mod ln;
pub mod mkdir;
pub mod mktemp;
pub mod mv;
pub mod pathinfo;
pub mod realpath;
pub mod rm;
pub mod rmdir;
pub mod shred;
pub mod split;
pub mod stat;
pub mod tee;
pub mod touch;
pub mod tree;
pub mod truncate;
pub mod unlink;
pub mod watcher;
