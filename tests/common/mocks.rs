//! Mock of a CSV byte source.
use mockall::mock;

use std::io::{self, Read};

mock! {
    pub Source {}
    impl Read for Source {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    }
}
