//! teloxide dispatcher wiring.

use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{error, info, warn};

use super::router::CommandRouter;
use crate::transport::telegram::{inbound_callback, inbound_message};

/// Run the long-polling dispatcher until Ctrl-C.
pub async fn run_dispatcher(bot: Bot, router: Arc<CommandRouter>) {
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback));

    info!("Bot dispatcher started");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![router])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
    info!("Bot dispatcher stopped");
}

async fn on_message(msg: Message, router: Arc<CommandRouter>) -> ResponseResult<()> {
    let Some(inbound) = inbound_message(&msg) else {
        return Ok(());
    };
    if let Err(e) = router.handle_message(inbound).await {
        error!("Message handler failed in chat {}: {:#}", msg.chat.id, e);
    }
    Ok(())
}

async fn on_callback(bot: Bot, q: CallbackQuery, router: Arc<CommandRouter>) -> ResponseResult<()> {
    // Stop the client-side spinner first; the work below can take a while.
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!("Failed to answer callback {}: {}", q.id, e);
    }

    let Some(callback) = inbound_callback(&q) else {
        return Ok(());
    };
    if let Err(e) = router.handle_callback(callback).await {
        error!("Callback handler failed: {:#}", e);
    }
    Ok(())
}
