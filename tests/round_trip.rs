use super::util::*;
use crate::{Connector, Poller};
use color_eyre::eyre::{ensure, eyre};

#[test]
fn ping() -> TestResult {
    test_wrapper(|| {
        let (path, mut acceptor) = listen_and_pick_path(make_id!(), 1)?;
        let mut outbound = Connector::connect(&path)?;

        let mut poller = Poller::new();
        poller.add_acceptor(&acceptor);
        poller.add_connector(&outbound);
        poller.poll(1000)?;
        acceptor.update(poller.at(0).unwrap_or_default())?;
        outbound.update(poller.at(1).unwrap_or_default())?;

        let mut inbound = acceptor
            .accept()?
            .ok_or_else(|| eyre!("acceptor was not readable with a client pending"))?;
        ensure_eq!(outbound.try_send(b"PING")?, Some(4));

        poller.add_connector(&inbound);
        poller.poll(1000)?;
        let ev = poller.at(2).unwrap_or_default();
        ensure!(ev.is_readable(), "inbound side not readable after send: {ev:?}");
        inbound.update(ev)?;

        let mut buf = [0; 4];
        ensure_eq!(inbound.try_recv(&mut buf)?, Some(4));
        ensure_eq!(&buf, b"PING");
        Ok(())
    })
}
