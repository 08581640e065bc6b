pub mod align;
pub mod anagram;
pub mod case;
pub mod cat;
pub mod charfreq;
pub mod chunk;
pub mod col;
pub mod colorize;
pub mod colreplace;
pub mod crossref;
pub mod cut;
pub mod dedup;
pub mod expand;
pub mod fieldmap;
pub mod fmt;
pub mod fold;
pub mod head;
pub mod histogram;
pub mod indent;
pub mod interleave;
pub mod linefilter;
pub mod linenum;
pub mod linesplit;
pub mod nl;
pub mod outline;
pub mod palindrome;
pub mod paste;
pub mod rev;
pub mod sort;
pub mod strings;
pub mod table;
pub mod tac;
pub mod tail;
pub mod tr;
pub mod trim;
pub mod uniq;
pub mod wc;
