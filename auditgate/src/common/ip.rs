//! IPアドレス正規化ユーティリティ
//!
//! IPv4-mapped IPv6アドレスをIPv4に正規化し、監査ログのclient欄に使う

use std::net::{IpAddr, SocketAddr};

/// IPアドレスを正規化する
///
/// IPv4-mapped IPv6（::ffff:x.x.x.x）をIPv4に変換。
/// それ以外はそのまま返す。
pub fn normalize_ip(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .map(IpAddr::V4)
            .unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    }
}

/// 接続元アドレスから監査ログ用のclient文字列を作る
///
/// 接続情報が取れない場合（テストのoneshot呼び出し等）はNone。
pub fn client_label(addr: Option<SocketAddr>) -> Option<String> {
    addr.map(|a| normalize_ip(a.ip()).to_string())
}
