//! Main control slice task

use defmt::*;
use embassy_futures::yield_now;

use crate::io::FirmwareBoard;
use crate::shared::HOST;

#[embassy_executor::task]
pub async fn slice_task(mut board: FirmwareBoard) {
    board.init();
    board.reset(true);
    info!(
        "Board ready (interface board: {}, single tool: {})",
        board.has_interface_board(),
        board.settings().single_tool
    );

    let mut shutdown_logged = false;
    loop {
        board.run_slice();

        let now = board.now();
        board.feedback_mut().service(now);

        if HOST.is_heat_shutdown() && !shutdown_logged {
            shutdown_logged = true;
            error!("Heat shutdown: {}", board.shutdown_state());
        }

        yield_now().await;
    }
}
