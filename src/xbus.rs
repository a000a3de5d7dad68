// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! XBus 广播总线
//!
//! 显式的订阅者列表, 每个订阅者一条有界 crossbeam 通道:
//! - `post` 一对多分发, 对慢订阅者用 `try_send`, 队列满时只丢这一条
//! - 已断开的订阅者在下一次 `post` 时被移除
//! - `close` 丢弃所有发送端, 接收端随即看到断开

use crossbeam_channel::{Receiver, RecvError, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use std::time::Duration;
use tracing::{debug, trace};

/// 订阅句柄
///
/// 丢弃句柄即退订 (发送端在下一次 `post` 时发现断开)
pub struct Subscription<T> {
    id: u64,
    rx: Receiver<T>,
}

impl<T> Subscription<T> {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 阻塞接收; 总线关闭且队列清空后返回错误
    pub fn recv(&self) -> Result<T, RecvError> {
        self.rx.recv()
    }

    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        self.rx.try_recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// 取出当前队列里的所有消息 (不阻塞)
    pub fn drain(&self) -> Vec<T> {
        self.rx.try_iter().collect()
    }
}

struct Subscriber<T> {
    id: u64,
    tx: Sender<T>,
    dropped: u64,
}

/// 广播总线
pub struct Bus<T> {
    subscribers: Vec<Subscriber<T>>,
    next_id: u64,
    capacity: usize,
    closed: bool,
}

impl<T: Clone> Bus<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 1,
            capacity: capacity.max(1),
            closed: false,
        }
    }

    /// 订阅; 总线已关闭时返回一个立即断开的句柄
    pub fn subscribe(&mut self) -> Subscription<T> {
        let id = self.next_id;
        self.next_id += 1;

        let (tx, rx) = crossbeam_channel::bounded(self.capacity);
        if self.closed {
            drop(tx);
        } else {
            self.subscribers.push(Subscriber { id, tx, dropped: 0 });
            debug!(id, "📡 新订阅者");
        }
        Subscription { id, rx }
    }

    /// 退订; 返回该订阅者是否存在
    pub fn unsubscribe(&mut self, id: u64) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        before != self.subscribers.len()
    }

    /// 发布消息, 返回成功送达的订阅者数量
    pub fn post(&mut self, message: T) -> usize {
        if self.closed {
            return 0;
        }

        let mut delivered = 0;
        self.subscribers.retain_mut(|subscriber| {
            match subscriber.tx.try_send(message.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    subscriber.dropped += 1;
                    trace!(id = subscriber.id, dropped = subscriber.dropped, "订阅者队列已满, 丢弃");
                    true
                }
                Err(TrySendError::Disconnected(_)) => {
                    debug!(id = subscriber.id, "订阅者已断开, 移除");
                    false
                }
            }
        });
        delivered
    }

    /// 关闭总线 (幂等)
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let count = self.subscribers.len();
        self.subscribers.clear();
        debug!(count, "📴 总线已关闭");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// 某订阅者因队列满被丢弃的消息数
    pub fn dropped_count(&self, id: u64) -> Option<u64> {
        self.subscribers.iter().find(|s| s.id == id).map(|s| s.dropped)
    }
}
