//! Spotify Web API client (client-credentials flow, blocking)

use std::fmt;

use serde::Deserialize;
use tracing::debug;
use ureq::Agent;

use super::{ArtistGenres, GenreSource};
use crate::config::SpotifyConfig;
use crate::error::{Error, Result};

const CLIENT_ID_VAR: &str = "CLIENT_ID";
const CLIENT_SECRET_VAR: &str = "CLIENT_SECRET";

/// Pre-shared application credentials.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    /// Create credentials, rejecting empty values.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();
        if client_id.trim().is_empty() {
            return Err(Error::Credentials(format!("{CLIENT_ID_VAR} is empty")));
        }
        if client_secret.trim().is_empty() {
            return Err(Error::Credentials(format!("{CLIENT_SECRET_VAR} is empty")));
        }
        Ok(Self {
            client_id,
            client_secret,
        })
    }

    /// Read `CLIENT_ID` and `CLIENT_SECRET` from the environment.
    pub fn from_env() -> Result<Self> {
        let read = |var: &str| {
            std::env::var(var).map_err(|_| Error::Credentials(format!("{var} is not set")))
        };
        Self::new(read(CLIENT_ID_VAR)?, read(CLIENT_SECRET_VAR)?)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TracksResponse {
    tracks: Vec<Option<TrackObject>>,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    artists: Vec<ArtistRef>,
}

/// Local files have artists without ids.
#[derive(Debug, Deserialize)]
struct ArtistRef {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArtistsResponse {
    artists: Vec<Option<ArtistObject>>,
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    id: String,
    #[serde(default)]
    genres: Vec<String>,
}

impl TracksResponse {
    fn into_artist_ids(self) -> Vec<String> {
        self.tracks
            .into_iter()
            .flatten()
            .flat_map(|track| track.artists)
            .filter_map(|artist| artist.id)
            .collect()
    }
}

impl ArtistsResponse {
    fn into_genres(self) -> Vec<ArtistGenres> {
        self.artists
            .into_iter()
            .flatten()
            .map(|artist| ArtistGenres {
                artist_id: artist.id,
                genres: artist.genres,
            })
            .collect()
    }
}

/// Authenticated Spotify client. The token is fetched once, on connect.
pub struct SpotifyClient {
    agent: Agent,
    api_base: String,
    token: String,
}

impl SpotifyClient {
    /// Exchange credentials for a bearer token.
    pub fn connect(credentials: &Credentials, config: &SpotifyConfig) -> Result<Self> {
        let agent = Agent::new_with_defaults();

        debug!("Requesting access token from {}", config.token_url);
        let token: TokenResponse = agent
            .post(&config.token_url)
            .send_form([
                ("grant_type", "client_credentials"),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
            ])
            .map_err(|e| http_error(e, &config.token_url))?
            .body_mut()
            .read_json()
            .map_err(|e| http_error(e, &config.token_url))?;

        Ok(Self {
            agent,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: token.access_token,
        })
    }

    fn get_json<T>(&self, endpoint: &str, ids: &[String]) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{endpoint}", self.api_base);
        debug!("GET {url} ({} ids)", ids.len());

        self.agent
            .get(&url)
            .query("ids", ids.join(","))
            .header("Authorization", format!("Bearer {}", self.token))
            .call()
            .map_err(|e| http_error(e, &url))?
            .body_mut()
            .read_json()
            .map_err(|e| http_error(e, &url))
    }
}

impl GenreSource for SpotifyClient {
    fn artist_ids_for_tracks(&self, track_ids: &[String]) -> Result<Vec<String>> {
        let response: TracksResponse = self.get_json("tracks", track_ids)?;
        Ok(response.into_artist_ids())
    }

    fn genres_for_artists(&self, artist_ids: &[String]) -> Result<Vec<ArtistGenres>> {
        let response: ArtistsResponse = self.get_json("artists", artist_ids)?;
        Ok(response.into_genres())
    }
}

/// Status codes >= 400 become `HttpStatus`; everything else is a transport error.
fn http_error(err: ureq::Error, url: &str) -> Error {
    match err {
        ureq::Error::StatusCode(status) => Error::HttpStatus {
            status,
            url: url.to_string(),
        },
        other => Error::Http(other),
    }
}
