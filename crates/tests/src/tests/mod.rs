mod launch;
mod poller;
mod shutdown;
